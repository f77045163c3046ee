//! Raster primitives for the diagnostics images: a discrete blue-white-red heat map and a
//! plain line chart, both drawn into RGBA buffers.

use image::{GenericImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use ndarray::Array2;

use crate::error::Result;

pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const FRAME: Rgba<u8> = Rgba([0, 0, 0, 255]);
const SERIES_LINE: Rgba<u8> = Rgba([31, 119, 180, 255]);
const NO_DATA: Rgba<u8> = Rgba([200, 200, 200, 255]);

/// Discrete diverging colour scale over `[min, max]` split into `levels - 1` bands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    min: f64,
    max: f64,
    levels: usize,
}

impl ColorScale {
    pub fn new(min: f64, max: f64, levels: usize) -> Self {
        Self {
            min,
            max,
            levels: levels.max(2),
        }
    }

    /// Scale spanning the finite values of `values`; `None` when there are none.
    pub fn spanning<'a>(values: impl IntoIterator<Item = &'a f64>, levels: usize) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |range: Option<(f64, f64)>, &v| match range {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            })?;
        Some(Self::new(min, max, levels))
    }

    pub fn bands(&self) -> usize {
        self.levels - 1
    }

    /// Index of the band holding `value`, clamped to the scale
    pub fn band(&self, value: f64) -> usize {
        let span = self.max - self.min;
        if span <= 0.0 {
            return self.bands() / 2;
        }
        let position = ((value - self.min) / span * self.bands() as f64).floor();
        position.clamp(0.0, (self.bands() - 1) as f64) as usize
    }

    pub fn color(&self, value: f64) -> Rgba<u8> {
        if !value.is_finite() {
            return NO_DATA;
        }
        let t = (self.band(value) as f64 + 0.5) / self.bands() as f64;
        blue_white_red(t)
    }
}

/// Blue (t = 0) through white (t = 0.5) to red (t = 1)
fn blue_white_red(t: f64) -> Rgba<u8> {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        let c = (2.0 * t * 255.0).round() as u8;
        Rgba([c, c, 255, 255])
    } else {
        let c = ((2.0 - 2.0 * t) * 255.0).round() as u8;
        Rgba([255, c, c, 255])
    }
}

/// Paint `field` as a heat map filling a `width` x `height` image.
///
/// Row 0 of the field ends up at the bottom of the image, matching grids stored south to north.
pub fn heat_map(field: &Array2<f64>, scale: &ColorScale, width: u32, height: u32) -> RgbaImage {
    let (rows, cols) = field.dim();
    if rows == 0 || cols == 0 {
        return no_data_panel(width, height);
    }

    RgbaImage::from_fn(width, height, |px, py| {
        let row = rows - 1 - (py as usize * rows / height as usize).min(rows - 1);
        let col = (px as usize * cols / width as usize).min(cols - 1);
        scale.color(field[[row, col]])
    })
}

pub fn no_data_panel(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, NO_DATA)
}

/// Line chart of `points` (x, y) inside a framed plot area.
///
/// Non-finite y values break the line rather than being drawn.
pub fn line_chart(points: &[(f64, f64)], width: u32, height: u32, margin: u32) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(width, height, BACKGROUND);
    let plot_width = width.saturating_sub(2 * margin).max(1);
    let plot_height = height.saturating_sub(2 * margin).max(1);
    draw_hollow_rect_mut(
        &mut image,
        Rect::at(margin as i32, margin as i32).of_size(plot_width, plot_height),
        FRAME,
    );

    let finite: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    let Some(bounds) = Bounds::of(&finite) else {
        return image;
    };

    let project = |(x, y): (f64, f64)| -> (f32, f32) {
        let px = margin as f64 + bounds.x_fraction(x) * (plot_width - 1) as f64;
        let py = (margin + plot_height - 1) as f64 - bounds.y_fraction(y) * (plot_height - 1) as f64;
        (px as f32, py as f32)
    };

    if finite.len() == 1 {
        let (px, py) = project(finite[0]);
        draw_filled_rect_mut(
            &mut image,
            Rect::at(px as i32 - 2, py as i32 - 2).of_size(5, 5),
            SERIES_LINE,
        );
        return image;
    }

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.1.is_finite() && b.1.is_finite() && a.0.is_finite() && b.0.is_finite() {
            draw_line_segment_mut(&mut image, project(a), project(b), SERIES_LINE);
        }
    }
    image
}

/// Place `panels` left to right on a single canvas
pub fn side_by_side(panels: &[RgbaImage]) -> Result<RgbaImage> {
    let width = panels.iter().map(|p| p.width()).sum();
    let height = panels.iter().map(|p| p.height()).max().unwrap_or(0);
    let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);

    let mut x = 0;
    for panel in panels {
        canvas.copy_from(panel, x, 0)?;
        x += panel.width();
    }
    Ok(canvas)
}

struct Bounds {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Bounds {
    fn of(points: &[(f64, f64)]) -> Option<Self> {
        let first = points.first()?;
        Some(points.iter().fold(
            Self {
                x_min: first.0,
                x_max: first.0,
                y_min: first.1,
                y_max: first.1,
            },
            |b, &(x, y)| Self {
                x_min: b.x_min.min(x),
                x_max: b.x_max.max(x),
                y_min: b.y_min.min(y),
                y_max: b.y_max.max(y),
            },
        ))
    }

    fn x_fraction(&self, x: f64) -> f64 {
        fraction(x, self.x_min, self.x_max)
    }

    fn y_fraction(&self, y: f64) -> f64 {
        fraction(y, self.y_min, self.y_max)
    }
}

fn fraction(value: f64, min: f64, max: f64) -> f64 {
    if max > min {
        (value - min) / (max - min)
    } else {
        0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_scale_has_twenty_bands_for_twenty_one_levels() {
        let scale = ColorScale::new(0.0, 20.0, 21);
        assert_eq!(scale.bands(), 20);
        assert_eq!(scale.band(0.0), 0);
        assert_eq!(scale.band(10.5), 10);
        assert_eq!(scale.band(20.0), 19);
        assert_eq!(scale.band(-5.0), 0);
    }

    #[test]
    fn test_scale_ends_are_blue_and_red() {
        let scale = ColorScale::new(-1.0, 1.0, 21);
        let low = scale.color(-1.0);
        let high = scale.color(1.0);
        assert!(low[2] == 255 && low[0] < 20);
        assert!(high[0] == 255 && high[2] < 20);
        assert_eq!(scale.color(f64::NAN), NO_DATA);
    }

    #[test]
    fn test_spanning_ignores_non_finite_values() {
        let values = [f64::NAN, 2.0, -3.0, f64::INFINITY];
        let scale = ColorScale::spanning(values.iter(), 21).unwrap();
        assert_eq!(scale, ColorScale::new(-3.0, 2.0, 21));
        assert!(ColorScale::spanning([f64::NAN].iter(), 21).is_none());
    }

    #[test]
    fn test_heat_map_puts_first_row_at_bottom() {
        let field = array![[0.0, 0.0], [10.0, 10.0]];
        let scale = ColorScale::spanning(field.iter(), 21).unwrap();
        let image = heat_map(&field, &scale, 4, 4);

        assert_eq!(image.get_pixel(0, 3), &scale.color(0.0));
        assert_eq!(image.get_pixel(0, 0), &scale.color(10.0));
    }

    #[test]
    fn test_line_chart_draws_inside_frame() {
        let image = line_chart(&[(0.0, 1.0), (1.0, 3.0), (2.0, 2.0)], 100, 60, 10);
        assert_eq!(image.dimensions(), (100, 60));
        // lower-left end of the first segment
        assert_eq!(image.get_pixel(10, 49), &SERIES_LINE);
        // outside the plot area stays blank
        assert_eq!(image.get_pixel(2, 2), &BACKGROUND);
    }

    #[test]
    fn test_side_by_side_concatenates_panels() {
        let left = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255]));
        let right = RgbaImage::from_pixel(4, 5, Rgba([9, 9, 9, 255]));
        let canvas = side_by_side(&[left, right]).unwrap();
        assert_eq!(canvas.dimensions(), (7, 5));
        assert_eq!(canvas.get_pixel(0, 0), &Rgba([1, 2, 3, 255]));
        assert_eq!(canvas.get_pixel(6, 4), &Rgba([9, 9, 9, 255]));
        assert_eq!(canvas.get_pixel(0, 4), &BACKGROUND);
    }
}
