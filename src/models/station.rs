use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StationLocation {
    #[validate(length(min = 1))]
    pub name: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl StationLocation {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

/// Monitoring sites of the hourly dataset with their approximate coordinates
const STATION_COORDINATES: [(&str, f64, f64); 12] = [
    ("Aotizhongxin", 39.982, 116.397),
    ("Changping", 40.217, 116.230),
    ("Dingling", 40.292, 116.220),
    ("Dongsi", 39.929, 116.417),
    ("Guanyuan", 39.929, 116.339),
    ("Gucheng", 39.914, 116.184),
    ("Huairou", 40.328, 116.628),
    ("Nongzhanguan", 39.937, 116.461),
    ("Shunyi", 40.127, 116.655),
    ("Tiantan", 39.886, 116.407),
    ("Wanliu", 39.987, 116.287),
    ("Wanshouxigong", 39.878, 116.352),
];

/// Fixed station name to coordinate lookup
#[derive(Debug, Clone)]
pub struct StationReference {
    stations: Vec<StationLocation>,
}

impl StationReference {
    pub fn new() -> Self {
        Self {
            stations: STATION_COORDINATES
                .iter()
                .map(|(name, lat, lon)| StationLocation::new(*name, *lat, *lon))
                .collect(),
        }
    }

    /// Case-insensitive lookup by station name
    pub fn lookup(&self, name: &str) -> Option<&StationLocation> {
        let name = name.trim();
        self.stations
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn stations(&self) -> &[StationLocation] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

impl Default for StationReference {
    fn default() -> Self {
        Self::new()
    }
}
