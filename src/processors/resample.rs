use crate::models::{AirQualityRecord, Measure};
use crate::processors::aggregation::MeanAccumulator;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyValue {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Daily mean of `measure` over all stations and hours.
///
/// Covers every calendar day from the first to the last observed date; days
/// without a present value are absent rather than skipped.
pub fn resample_daily<'a, I>(records: I, measure: Measure) -> Vec<DailyValue>
where
    I: IntoIterator<Item = &'a AirQualityRecord>,
{
    let mut days: BTreeMap<NaiveDate, MeanAccumulator> = BTreeMap::new();

    for record in records {
        if let Some(date) = record.date() {
            days.entry(date).or_default().push(record.get(measure));
        }
    }

    let (Some(first), Some(last)) = (
        days.keys().next().copied(),
        days.keys().next_back().copied(),
    ) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|date| DailyValue {
            date,
            value: days.get(&date).and_then(MeanAccumulator::mean),
        })
        .collect()
}

/// Carry the last present value forward over gaps. Leading gaps stay absent.
pub fn forward_fill(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    values
        .iter()
        .map(|v| {
            if v.is_some() {
                last = *v;
            }
            last
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(day: u32, hour: u32, value: Option<f64>) -> AirQualityRecord {
        AirQualityRecord::new(2016, 2, day, hour, "Huairou").with_measure(Measure::Co, value)
    }

    #[test]
    fn test_daily_means_fill_calendar_gaps() {
        let records = vec![
            record(27, 0, Some(100.0)),
            record(27, 1, Some(300.0)),
            record(28, 0, None),
            record(1, 0, Some(50.0)), // Feb 1, before the others
            record(29, 5, Some(10.0)),
        ];

        let daily = resample_daily(&records, Measure::Co);

        assert_eq!(daily.len(), 29);
        assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2016, 2, 1).unwrap());
        assert_eq!(daily[0].value, Some(50.0));
        assert_eq!(daily[1].value, None);
        assert_eq!(daily[26].value, Some(200.0));
        assert_eq!(daily[27].value, None);
        assert_eq!(daily[28].value, Some(10.0));
    }

    #[test]
    fn test_empty_input() {
        assert!(resample_daily(&Vec::<AirQualityRecord>::new(), Measure::Co).is_empty());
    }

    #[test]
    fn test_forward_fill() {
        let filled = forward_fill(&[None, Some(1.0), None, None, Some(3.0), None]);
        assert_eq!(filled, vec![None, Some(1.0), Some(1.0), Some(1.0), Some(3.0), Some(3.0)]);
    }
}
