/// Source column names
pub const COL_YEAR: &str = "year";
pub const COL_MONTH: &str = "month";
pub const COL_DAY: &str = "day";
pub const COL_HOUR: &str = "hour";
pub const COL_STATION: &str = "station";
pub const COL_WIND_DIRECTION: &str = "wd";

/// Tokens the source uses for a missing measurement
pub const MISSING_TOKENS: [&str; 4] = ["", "NA", "NaN", "nan"];

/// Settings file looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "aq-dataset.toml";
pub const ENV_PREFIX: &str = "AQ";

/// Processing defaults
pub const DEFAULT_DATA_PATH: &str = "data/air_quality.csv";
pub const DEFAULT_DELIMITER: char = ',';
pub const DEFAULT_ROLLING_WINDOW: usize = 24;
pub const DEFAULT_DECOMPOSITION_PERIOD: usize = 7;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Floating point tolerance for a zero-variance series
pub const VARIANCE_EPSILON: f64 = 1e-12;
