use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::error::AqError;
use crate::models::Measure;

/// 16-point compass wind direction as coded in the source (`wd` column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WindDirection {
    N,
    Nne,
    Ne,
    Ene,
    E,
    Ese,
    Se,
    Sse,
    S,
    Ssw,
    Sw,
    Wsw,
    W,
    Wnw,
    Nw,
    Nnw,
}

impl WindDirection {
    /// Compass order, clockwise from north
    pub const ALL: [WindDirection; 16] = [
        WindDirection::N,
        WindDirection::Nne,
        WindDirection::Ne,
        WindDirection::Ene,
        WindDirection::E,
        WindDirection::Ese,
        WindDirection::Se,
        WindDirection::Sse,
        WindDirection::S,
        WindDirection::Ssw,
        WindDirection::Sw,
        WindDirection::Wsw,
        WindDirection::W,
        WindDirection::Wnw,
        WindDirection::Nw,
        WindDirection::Nnw,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            WindDirection::N => "N",
            WindDirection::Nne => "NNE",
            WindDirection::Ne => "NE",
            WindDirection::Ene => "ENE",
            WindDirection::E => "E",
            WindDirection::Ese => "ESE",
            WindDirection::Se => "SE",
            WindDirection::Sse => "SSE",
            WindDirection::S => "S",
            WindDirection::Ssw => "SSW",
            WindDirection::Sw => "SW",
            WindDirection::Wsw => "WSW",
            WindDirection::W => "W",
            WindDirection::Wnw => "WNW",
            WindDirection::Nw => "NW",
            WindDirection::Nnw => "NNW",
        }
    }

    /// Bearing of the sector centre in degrees
    pub fn degrees(&self) -> f64 {
        let index = Self::ALL.iter().position(|d| d == self).unwrap_or(0);
        index as f64 * 22.5
    }
}

impl fmt::Display for WindDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}

impl FromStr for WindDirection {
    type Err = AqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| AqError::UnknownName {
                kind: "wind direction",
                value: s.to_string(),
            })
    }
}

/// One station-hour observation. Absent measurements are `None`, never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AirQualityRecord {
    pub year: i32,

    #[validate(range(min = 1, max = 12))]
    pub month: u32,

    #[validate(range(min = 1, max = 31))]
    pub day: u32,

    #[validate(range(max = 23))]
    pub hour: u32,

    #[validate(length(min = 1))]
    pub station: String,

    pub wd: Option<WindDirection>,

    #[serde(rename = "PM2.5")]
    #[validate(range(min = 0.0))]
    pub pm25: Option<f64>,

    #[serde(rename = "PM10")]
    #[validate(range(min = 0.0))]
    pub pm10: Option<f64>,

    #[serde(rename = "SO2")]
    #[validate(range(min = 0.0))]
    pub so2: Option<f64>,

    #[serde(rename = "NO2")]
    #[validate(range(min = 0.0))]
    pub no2: Option<f64>,

    #[serde(rename = "CO")]
    #[validate(range(min = 0.0))]
    pub co: Option<f64>,

    #[serde(rename = "O3")]
    #[validate(range(min = 0.0))]
    pub o3: Option<f64>,

    #[serde(rename = "TEMP")]
    pub temp: Option<f64>,

    #[serde(rename = "PRES")]
    pub pres: Option<f64>,

    #[serde(rename = "DEWP")]
    pub dewp: Option<f64>,

    #[serde(rename = "RAIN")]
    #[validate(range(min = 0.0))]
    pub rain: Option<f64>,

    #[serde(rename = "WSPM")]
    #[validate(range(min = 0.0))]
    pub wspm: Option<f64>,

    // Derived fields, filled by `derive_temporal_fields`
    pub date: Option<NaiveDate>,
    pub weekday: Option<u32>,
}

impl AirQualityRecord {
    /// Record with all measurements absent and no derived fields yet
    pub fn new(year: i32, month: u32, day: u32, hour: u32, station: impl Into<String>) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            station: station.into(),
            wd: None,
            pm25: None,
            pm10: None,
            so2: None,
            no2: None,
            co: None,
            o3: None,
            temp: None,
            pres: None,
            dewp: None,
            rain: None,
            wspm: None,
            date: None,
            weekday: None,
        }
    }

    pub fn with_measure(mut self, measure: Measure, value: Option<f64>) -> Self {
        self.set(measure, value);
        self
    }

    pub fn with_wind_direction(mut self, wd: WindDirection) -> Self {
        self.wd = Some(wd);
        self
    }

    pub fn get(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::Pm25 => self.pm25,
            Measure::Pm10 => self.pm10,
            Measure::So2 => self.so2,
            Measure::No2 => self.no2,
            Measure::Co => self.co,
            Measure::O3 => self.o3,
            Measure::Temp => self.temp,
            Measure::Pres => self.pres,
            Measure::Dewp => self.dewp,
            Measure::Rain => self.rain,
            Measure::Wspm => self.wspm,
        }
    }

    pub fn set(&mut self, measure: Measure, value: Option<f64>) {
        let slot = match measure {
            Measure::Pm25 => &mut self.pm25,
            Measure::Pm10 => &mut self.pm10,
            Measure::So2 => &mut self.so2,
            Measure::No2 => &mut self.no2,
            Measure::Co => &mut self.co,
            Measure::O3 => &mut self.o3,
            Measure::Temp => &mut self.temp,
            Measure::Pres => &mut self.pres,
            Measure::Dewp => &mut self.dewp,
            Measure::Rain => &mut self.rain,
            Measure::Wspm => &mut self.wspm,
        };
        *slot = value;
    }

    /// Calendar date reconstructed from (year, month, day)
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    /// Derived date if present, otherwise reconstructed on the fly
    pub fn date(&self) -> Option<NaiveDate> {
        self.date.or_else(|| self.calendar_date())
    }

    /// Derived weekday (Monday = 0) if present, otherwise reconstructed
    pub fn weekday(&self) -> Option<u32> {
        self.weekday
            .or_else(|| self.date().map(|d| d.weekday().num_days_from_monday()))
    }

    pub fn has_derived_fields(&self) -> bool {
        self.date.is_some() && self.weekday.is_some()
    }

    pub fn present_measures(&self) -> usize {
        Measure::ALL
            .iter()
            .filter(|m| self.get(**m).is_some())
            .count()
    }
}
