use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AqError>;

#[derive(Error, Debug)]
pub enum AqError {
    #[error("Data unavailable from '{}': {reason}", .path.display())]
    DataUnavailable { path: PathBuf, reason: String },

    #[error("Insufficient data for {operation}: need {required}, have {available}")]
    InsufficientData {
        operation: &'static str,
        required: usize,
        available: usize,
    },

    #[error("Invalid calendar date {year}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown {kind}: '{value}'")]
    UnknownName { kind: &'static str, value: String },

    #[error("Dataset cache lock poisoned")]
    CachePoisoned,
}

impl AqError {
    pub fn data_unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        AqError::DataUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn insufficient(operation: &'static str, required: usize, available: usize) -> Self {
        AqError::InsufficientData {
            operation,
            required,
            available,
        }
    }

    /// Warning-level failures a view can degrade from without aborting the session
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AqError::InsufficientData { .. })
    }
}
