pub mod dataset_summary;
pub mod station_map;
pub mod wind_rose;

pub use dataset_summary::{DatasetAnalyzer, DatasetSummary, MeasureCoverage};
pub use station_map::{station_map, StationMap, StationPoint};
pub use wind_rose::{wind_direction_frequency, Distribution, WindSector};
