use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON decoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unsupported field rank in {}: shape {shape:?} (expected 2D or 3D)", path.display())]
    UnsupportedRank { path: PathBuf, shape: Vec<usize> },

    #[error("Malformed period suffix '{suffix}' in partition '{partition}' (expected YYYYMM)")]
    MalformedPeriod { partition: String, suffix: String },

    #[error("Grid derivation failed for {}: {reason}", path.display())]
    GridDerivation { path: PathBuf, reason: String },

    #[error("Shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Point ({ix}, {iy}, level {level}) outside field of shape {shape:?} in {}", path.display())]
    PointOutOfBounds {
        path: PathBuf,
        ix: usize,
        iy: usize,
        level: usize,
        shape: Vec<usize>,
    },

    #[error("{failed} of {total} runs failed")]
    RunsFailed { failed: usize, total: usize },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Missing required data: {0}")]
    MissingData(String),
}
