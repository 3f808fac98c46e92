use crate::error::{AqError, Result};
use crate::utils::constants::{
    DEFAULT_DATA_PATH, DEFAULT_DECOMPOSITION_PERIOD, DEFAULT_DELIMITER, DEFAULT_LOG_LEVEL,
    DEFAULT_ROLLING_WINDOW, DEFAULT_SETTINGS_FILE, ENV_PREFIX,
};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// Runtime settings: defaults, then an optional TOML file, then `AQ_*` environment variables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    pub data_path: PathBuf,

    #[validate(length(equal = 1))]
    pub delimiter: String,

    pub use_mmap: bool,

    #[validate(range(min = 1))]
    pub rolling_window: usize,

    #[validate(range(min = 2))]
    pub decomposition_period: usize,

    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            delimiter: DEFAULT_DELIMITER.to_string(),
            use_mmap: false,
            rolling_window: DEFAULT_ROLLING_WINDOW,
            decomposition_period: DEFAULT_DECOMPOSITION_PERIOD,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Settings {
    /// Load settings. An explicit `path` must exist; otherwise `aq-dataset.toml`
    /// in the working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::new(DEFAULT_SETTINGS_FILE, FileFormat::Toml).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [b] => Ok(*b),
            _ => Err(AqError::InvalidParameter(format!(
                "delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            ))),
        }
    }
}
