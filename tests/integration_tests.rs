use chrono::{NaiveDate, NaiveDateTime};
use ndarray::{Array2, Array4};
use pretty_assertions::assert_eq;
use sample_diagnostics::masking::{LandRegion, RegionOceanMasker};
use sample_diagnostics::models::{GridPoint, PeriodKey, ProjectionParams};
use sample_diagnostics::processors::{
    AggregationEngine, AggregationSettings, PointExtractor, RunOrchestrator,
};
use sample_diagnostics::readers::{JsonFieldDocument, JsonFieldSource, SampleArchive};
use sample_diagnostics::settings::DiagnosticsConfig;
use sample_diagnostics::writers::{DiagnosticsWriter, PointSeriesWriter};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// 2x3 grid; the two western columns (270 and 300 wrap to -90 and -60) are land
fn grid_document() -> JsonFieldDocument {
    let lons = ndarray::array![[270.0, 300.0, 10.0], [270.0, 300.0, 10.0]];
    let lats = ndarray::array![[40.0, 40.0, 40.0], [50.0, 50.0, 50.0]];
    JsonFieldDocument::new().with_grid(&lons, &lats, ProjectionParams::new())
}

fn write_sample(archive: &Path, partition: &str, file: &str, variable: &str, value: f64) {
    let dir = archive.join(partition);
    fs::create_dir_all(&dir).unwrap();
    grid_document()
        .with_variable(variable, &Array2::from_elem((2, 3), value), vec![])
        .write_to(&dir.join(file))
        .unwrap();
}

fn three_month_archive(root: &Path) -> PathBuf {
    let archive = root.join("Samples");
    write_sample(&archive, "Samples_200101", "pm2001010100", "PR", 2.0);
    write_sample(&archive, "Samples_200101", "pm2001011500", "PR", 2.0);
    write_sample(&archive, "Samples_200102", "pm2001020100", "PR", 4.0);
    write_sample(&archive, "Samples_200103", "pm2001030100", "PR", 40.0);
    archive
}

fn western_land() -> RegionOceanMasker {
    RegionOceanMasker::new(vec![LandRegion::new(-170.0, -50.0, 15.0, 85.0)])
}

#[test]
fn test_three_partition_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let archive = three_month_archive(temp_dir.path());
    // noise that must not disturb the run
    write_sample(&archive, ".Samples_200104", "pm2001040100", "PR", 1000.0);
    write_sample(&archive, "Samples_200102", "dm2001020100", "PR", 1000.0);
    fs::write(archive.join("README"), "not a partition").unwrap();

    let source = JsonFieldSource::new();
    let masker = western_land();
    let settings = AggregationSettings::new("PR", "pm", [1, 2]);
    let engine = AggregationEngine::new(&source, &masker, &settings);

    let output = engine
        .run(SampleArchive::new(&archive).partitions().unwrap(), None)
        .unwrap();

    let mean = output.mean_field.unwrap();
    assert_eq!(mean.dim(), (2, 3));
    assert!(mean.iter().all(|v| (v - 8.0 / 3.0).abs() < 1e-12));
    assert_eq!(output.sample_count, 3);
    assert_eq!(output.partitions_processed, 3);

    let series: Vec<(NaiveDate, f64)> = output.time_series.iter().collect();
    assert_eq!(
        series,
        vec![
            (PeriodKey::new(2001, 1).unwrap().anchor_date(), 2.0),
            (PeriodKey::new(2001, 2).unwrap().anchor_date(), 4.0),
            (PeriodKey::new(2001, 3).unwrap().anchor_date(), 40.0),
        ]
    );
}

#[test]
fn test_compare_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let ctrl = three_month_archive(&temp_dir.path().join("ctrl"));
    let warm = temp_dir.path().join("warm").join("Samples");
    write_sample(&warm, "Samples_200012", "pm2000120100", "PR", 5.0);
    write_sample(&warm, "Samples_200101", "pm2001010100", "PR", 7.0);

    let config_path = temp_dir.path().join("diagnostics.toml");
    fs::write(
        &config_path,
        format!(
            r#"
climatology_months = [1, 2, 12]

[[simulations]]
label = "ctrl"
source_root = "{}"

[[simulations]]
label = "warm"
source_root = "{}"

[[variables]]
name = "PR"
unit_multiplier = 10.0

[[land_regions]]
lon_min = -170.0
lon_max = -50.0
lat_min = 15.0
lat_max = 85.0
"#,
            ctrl.display(),
            warm.display()
        ),
    )
    .unwrap();

    let config = DiagnosticsConfig::load(&config_path).unwrap();
    let source = JsonFieldSource::new();
    let masker = config.masker();
    let orchestrator = RunOrchestrator::new(&source, &masker, config.climatology_months.clone())
        .with_silent(true);
    let mut writer = DiagnosticsWriter::new().with_panel_size(96);

    let reports = orchestrator.execute(&config.run_specs(), &mut writer).unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.is_success()));

    // each archive gets its own diag_plots sibling
    let ctrl_plots = temp_dir.path().join("ctrl").join("diag_plots");
    let warm_plots = temp_dir.path().join("warm").join("diag_plots");
    assert!(ctrl_plots.join("PR_ctrl.png").is_file());
    assert!(warm_plots.join("PR_warm.png").is_file());

    let series = fs::read_to_string(ctrl_plots.join("PR_ctrl_series.csv")).unwrap();
    assert_eq!(
        series,
        "date,value\n2001-01-15,20.0\n2001-02-15,40.0\n2001-03-15,400.0\n"
    );

    let warm_mean = fs::read_to_string(warm_plots.join("PR_warm_mean.csv")).unwrap();
    assert_eq!(warm_mean, "60,60,60\n60,60,60\n");

    let ctrl_mean = fs::read_to_string(ctrl_plots.join("PR_ctrl_mean.csv")).unwrap();
    let values: Vec<f64> = ctrl_mean
        .lines()
        .flat_map(|line| line.split(','))
        .map(|v| v.parse().unwrap())
        .collect();
    assert_eq!(values.len(), 6);
    assert!(values.iter().all(|v| (v - 80.0 / 3.0).abs() < 1e-9));
}

#[test]
fn test_point_series_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("Samples");
    let at = |month: u32, day: u32| -> NaiveDateTime {
        NaiveDate::from_ymd_opt(1990, month, day)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap()
    };

    for (partition, month) in [("Samples_199001", 1), ("Samples_199002", 2)] {
        let dir = archive.join(partition);
        fs::create_dir_all(&dir).unwrap();
        let snow = Array4::from_shape_fn((2, 3, 2, 3), |(t, k, i, j)| {
            (month * 1000 + t * 100 + k * 10 + i * 3 + j) as f64
        });
        grid_document()
            .with_variable("DN", &snow, vec![at(month as u32, 1), at(month as u32, 2)])
            .write_to(&dir.join("pm_1"))
            .unwrap();
    }

    let source = JsonFieldSource::new();
    let point = GridPoint::new(1, 2).with_level(1);
    let series = PointExtractor::new(&source, "DN", "pm", point)
        .extract(SampleArchive::new(&archive).partitions().unwrap(), None)
        .unwrap();

    let values: Vec<f64> = series.iter().map(|(_, v)| v).collect();
    assert_eq!(values, vec![1015.0, 1115.0, 2015.0, 2115.0]);

    let output_dir = temp_dir.path().join("out");
    let (csv_path, image_path) = PointSeriesWriter::new(&output_dir)
        .with_size(160, 90)
        .write("DN", point.ix, point.iy, &series)
        .unwrap();

    assert_eq!(csv_path, output_dir.join("selected_data").join("DN_1_2.csv"));
    assert_eq!(image_path, output_dir.join("DN_1_2.png"));
    let content = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(content.lines().count(), 5);
    assert!(content.starts_with("date,value\n1990-01-01T06:00:00,1015.0\n"));
}
