pub mod analyzers;
pub mod cache;
pub mod cli;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod settings;
pub mod utils;

pub use cache::DatasetCache;
pub use error::{AqError, Result};
pub use processors::{DatasetPreparer, PreparedDataset};
pub use settings::Settings;
