use crate::models::{AirQualityRecord, GroupKey, Measure};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Running arithmetic mean that ignores absent values
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// `None` when nothing present was pushed
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

impl FromIterator<Option<f64>> for MeanAccumulator {
    fn from_iter<T: IntoIterator<Item = Option<f64>>>(iter: T) -> Self {
        let mut acc = Self::new();
        for value in iter {
            acc.push(value);
        }
        acc
    }
}

/// Value of a grouping dimension. Numeric keys sort numerically, station names lexically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupValue {
    Number(i64),
    Name(String),
}

impl GroupValue {
    pub fn of(record: &AirQualityRecord, key: GroupKey) -> Option<Self> {
        match key {
            GroupKey::Hour => Some(GroupValue::Number(record.hour as i64)),
            GroupKey::Weekday => record.weekday().map(|w| GroupValue::Number(w as i64)),
            GroupKey::Month => Some(GroupValue::Number(record.month as i64)),
            GroupKey::Year => Some(GroupValue::Number(record.year as i64)),
            GroupKey::Station => Some(GroupValue::Name(record.station.clone())),
        }
    }
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupValue::Number(n) => write!(f, "{}", n),
            GroupValue::Name(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMean {
    pub measure: Measure,
    pub mean: Option<f64>,
    pub observations: usize,
}

/// One aggregate row: the group key, how many records fell in it, and per-column means
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAverage {
    pub key: GroupValue,
    pub records: usize,
    pub columns: Vec<ColumnMean>,
}

impl GroupAverage {
    pub fn mean(&self, measure: Measure) -> Option<f64> {
        self.columns
            .iter()
            .find(|c| c.measure == measure)
            .and_then(|c| c.mean)
    }
}

/// Group records on `key` and average each requested column over its present values.
///
/// Output has one row per distinct key, in ascending key order. A column with
/// no present value in a group is `None` for that group.
pub fn group_and_average<'a, I>(records: I, key: GroupKey, columns: &[Measure]) -> Vec<GroupAverage>
where
    I: IntoIterator<Item = &'a AirQualityRecord>,
{
    let mut groups: BTreeMap<GroupValue, (usize, Vec<MeanAccumulator>)> = BTreeMap::new();

    for record in records {
        let Some(value) = GroupValue::of(record, key) else {
            continue;
        };

        let (count, accumulators) = groups
            .entry(value)
            .or_insert_with(|| (0, vec![MeanAccumulator::new(); columns.len()]));

        *count += 1;
        for (acc, measure) in accumulators.iter_mut().zip(columns) {
            acc.push(record.get(*measure));
        }
    }

    groups
        .into_iter()
        .map(|(key, (records, accumulators))| GroupAverage {
            key,
            records,
            columns: columns
                .iter()
                .zip(accumulators)
                .map(|(measure, acc)| ColumnMean {
                    measure: *measure,
                    mean: acc.mean(),
                    observations: acc.count(),
                })
                .collect(),
        })
        .collect()
}
