pub mod measure;
pub mod record;
pub mod station;

pub use measure::{GroupKey, Measure};
pub use record::{AirQualityRecord, WindDirection};
pub use station::{StationLocation, StationReference};
