use crate::models::{AirQualityRecord, Measure, WindDirection};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Five-number summary of a sector's values, as drawn by a box plot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl Distribution {
    /// `None` for an empty sample. Quartiles interpolate linearly between ranks.
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        Some(Self {
            min: values[0],
            q1: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q3: quantile(&values, 0.75),
            max: values[values.len() - 1],
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

// `sorted` must be non-empty and ascending
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindSector {
    pub direction: WindDirection,
    pub degrees: f64,
    pub count: usize,
    pub frequency: f64,
    pub mean: Option<f64>,
    /// Spread of the measure in this sector; absent without present values
    pub distribution: Option<Distribution>,
}

/// Observations per compass sector, in compass order, with the optional
/// mean and distribution of `measure` for each sector. Records without a
/// direction are not counted.
pub fn wind_direction_frequency<'a, I>(records: I, measure: Option<Measure>) -> Vec<WindSector>
where
    I: IntoIterator<Item = &'a AirQualityRecord>,
{
    let mut sectors: HashMap<WindDirection, (usize, Vec<f64>)> = HashMap::new();
    let mut total = 0usize;

    for record in records {
        let Some(direction) = record.wd else {
            continue;
        };
        let (count, values) = sectors.entry(direction).or_default();
        *count += 1;
        if let Some(v) = measure.and_then(|m| record.get(m)) {
            values.push(v);
        }
        total += 1;
    }

    WindDirection::ALL
        .iter()
        .map(|direction| {
            let (count, values) = sectors.remove(direction).unwrap_or_default();
            let mean = (!values.is_empty())
                .then(|| values.iter().sum::<f64>() / values.len() as f64);
            WindSector {
                direction: *direction,
                degrees: direction.degrees(),
                count,
                frequency: if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64
                },
                mean,
                distribution: Distribution::from_values(values),
            }
        })
        .collect()
}
