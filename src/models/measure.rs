use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AqError;

/// Numeric columns of the hourly dataset, named exactly as in the source header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Measure {
    #[serde(rename = "PM2.5")]
    Pm25,
    #[serde(rename = "PM10")]
    Pm10,
    #[serde(rename = "SO2")]
    So2,
    #[serde(rename = "NO2")]
    No2,
    #[serde(rename = "CO")]
    Co,
    #[serde(rename = "O3")]
    O3,
    #[serde(rename = "TEMP")]
    Temp,
    #[serde(rename = "PRES")]
    Pres,
    #[serde(rename = "DEWP")]
    Dewp,
    #[serde(rename = "RAIN")]
    Rain,
    #[serde(rename = "WSPM")]
    Wspm,
}

impl Measure {
    pub const ALL: [Measure; 11] = [
        Measure::Pm25,
        Measure::Pm10,
        Measure::So2,
        Measure::No2,
        Measure::Co,
        Measure::O3,
        Measure::Temp,
        Measure::Pres,
        Measure::Dewp,
        Measure::Rain,
        Measure::Wspm,
    ];

    pub const POLLUTANTS: [Measure; 6] = [
        Measure::Pm25,
        Measure::Pm10,
        Measure::So2,
        Measure::No2,
        Measure::Co,
        Measure::O3,
    ];

    pub const METEOROLOGY: [Measure; 5] = [
        Measure::Temp,
        Measure::Pres,
        Measure::Dewp,
        Measure::Rain,
        Measure::Wspm,
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            Measure::Pm25 => "PM2.5",
            Measure::Pm10 => "PM10",
            Measure::So2 => "SO2",
            Measure::No2 => "NO2",
            Measure::Co => "CO",
            Measure::O3 => "O3",
            Measure::Temp => "TEMP",
            Measure::Pres => "PRES",
            Measure::Dewp => "DEWP",
            Measure::Rain => "RAIN",
            Measure::Wspm => "WSPM",
        }
    }

    pub fn is_pollutant(&self) -> bool {
        Self::POLLUTANTS.contains(self)
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Measure::Pm25 | Measure::Pm10 | Measure::So2 | Measure::No2 | Measure::Co | Measure::O3 => {
                "µg/m³"
            }
            Measure::Temp | Measure::Dewp => "°C",
            Measure::Pres => "hPa",
            Measure::Rain => "mm",
            Measure::Wspm => "m/s",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.column_name())
    }
}

impl FromStr for Measure {
    type Err = AqError;

    /// Accepts the exact column name or a case-insensitive alias without punctuation (`pm25`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();

        Self::ALL
            .into_iter()
            .find(|m| {
                m.column_name() == s || m.column_name().replace('.', "") == wanted
            })
            .ok_or_else(|| AqError::UnknownName {
                kind: "measure",
                value: s.to_string(),
            })
    }
}

/// Dimension a dataset can be grouped on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKey {
    Hour,
    Weekday,
    Month,
    Year,
    Station,
}

impl GroupKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKey::Hour => "hour",
            GroupKey::Weekday => "weekday",
            GroupKey::Month => "month",
            GroupKey::Year => "year",
            GroupKey::Station => "station",
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for GroupKey {
    type Err = AqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" | "hourly" => Ok(GroupKey::Hour),
            "weekday" | "day_of_week" | "dow" => Ok(GroupKey::Weekday),
            "month" | "monthly" => Ok(GroupKey::Month),
            "year" | "yearly" => Ok(GroupKey::Year),
            "station" => Ok(GroupKey::Station),
            _ => Err(AqError::UnknownName {
                kind: "group key",
                value: s.to_string(),
            }),
        }
    }
}
