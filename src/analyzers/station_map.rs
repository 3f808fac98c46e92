use crate::models::{AirQualityRecord, GroupKey, Measure, StationReference};
use crate::processors::group_and_average;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One map marker: reference coordinates plus the station's mean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationPoint {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub records: usize,
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationMap {
    pub measure: Measure,
    pub points: Vec<StationPoint>,
    /// Stations present in the data but missing from the reference table
    pub unmatched: Vec<String>,
}

impl StationMap {
    /// Points with a mean, ordered from highest to lowest
    pub fn ranked(&self) -> Vec<&StationPoint> {
        let mut ranked: Vec<&StationPoint> = self.points.iter().filter(|p| p.mean.is_some()).collect();
        ranked.sort_by(|a, b| b.mean.partial_cmp(&a.mean).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}

/// Join per-station means with the reference coordinates.
///
/// Every reference station gets a point; those without data have no mean.
pub fn station_map<'a, I>(records: I, reference: &StationReference, measure: Measure) -> StationMap
where
    I: IntoIterator<Item = &'a AirQualityRecord>,
{
    let groups = group_and_average(records, GroupKey::Station, &[measure]);

    let points = reference
        .stations()
        .iter()
        .map(|station| {
            let group = groups
                .iter()
                .find(|g| g.key.to_string().eq_ignore_ascii_case(&station.name));
            StationPoint {
                name: station.name.clone(),
                latitude: station.latitude,
                longitude: station.longitude,
                records: group.map_or(0, |g| g.records),
                mean: group.and_then(|g| g.mean(measure)),
            }
        })
        .collect();

    let unmatched: Vec<String> = groups
        .iter()
        .map(|g| g.key.to_string())
        .filter(|name| reference.lookup(name).is_none())
        .collect();

    if !unmatched.is_empty() {
        warn!(stations = ?unmatched, "stations without reference coordinates");
    }

    StationMap {
        measure,
        points,
        unmatched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_map_joins_coordinates() {
        let records = vec![
            AirQualityRecord::new(2013, 3, 1, 0, "Dongsi").with_measure(Measure::Pm10, Some(100.0)),
            AirQualityRecord::new(2013, 3, 1, 1, "Dongsi").with_measure(Measure::Pm10, Some(50.0)),
            AirQualityRecord::new(2013, 3, 1, 0, "Huairou").with_measure(Measure::Pm10, Some(20.0)),
            AirQualityRecord::new(2013, 3, 1, 0, "Mars Base").with_measure(Measure::Pm10, Some(1.0)),
        ];

        let map = station_map(&records, &StationReference::new(), Measure::Pm10);

        assert_eq!(map.points.len(), 12);
        let dongsi = map.points.iter().find(|p| p.name == "Dongsi").unwrap();
        assert_eq!(dongsi.mean, Some(75.0));
        assert_eq!(dongsi.records, 2);

        let shunyi = map.points.iter().find(|p| p.name == "Shunyi").unwrap();
        assert_eq!(shunyi.mean, None);

        assert_eq!(map.unmatched, vec!["Mars Base".to_string()]);

        let ranked: Vec<&str> = map.ranked().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(ranked, vec!["Dongsi", "Huairou"]);
    }
}
