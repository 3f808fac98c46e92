use crate::error::{AqError, Result};
use crate::models::Measure;
use crate::processors::{PreparedDataset, SelectionBounds};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureCoverage {
    pub measure: Measure,
    pub present: usize,
    pub absent: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

impl MeasureCoverage {
    pub fn missing_percentage(&self) -> f64 {
        let total = self.present + self.absent;
        if total == 0 {
            0.0
        } else {
            (self.absent as f64 / total as f64) * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_records: usize,
    pub stations: Vec<String>,
    pub bounds: SelectionBounds,
    pub coverage: Vec<MeasureCoverage>,
}

pub struct DatasetAnalyzer;

impl DatasetAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, dataset: &PreparedDataset) -> Result<DatasetSummary> {
        let bounds = dataset
            .bounds()
            .ok_or_else(|| AqError::data_unavailable(dataset.source(), "dataset has no records"))?;

        let coverage = Measure::ALL
            .iter()
            .map(|measure| {
                let mut coverage = MeasureCoverage {
                    measure: *measure,
                    present: 0,
                    absent: 0,
                    min: None,
                    max: None,
                    mean: None,
                };
                let mut sum = 0.0;

                for record in dataset.records() {
                    match record.get(*measure) {
                        Some(v) => {
                            coverage.present += 1;
                            sum += v;
                            coverage.min = Some(coverage.min.map_or(v, |m| m.min(v)));
                            coverage.max = Some(coverage.max.map_or(v, |m| m.max(v)));
                        }
                        None => coverage.absent += 1,
                    }
                }

                if coverage.present > 0 {
                    coverage.mean = Some(sum / coverage.present as f64);
                }
                coverage
            })
            .collect();

        Ok(DatasetSummary {
            total_records: dataset.len(),
            stations: dataset.stations().into_iter().map(str::to_string).collect(),
            bounds,
            coverage,
        })
    }
}

impl Default for DatasetAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetSummary {
    pub fn summary(&self) -> String {
        format!(
            "Stations: {} ({})\n\
            Date Range: {} to {} ({} days)\n\
            Years: {}-{}\n\
            Records: {} total",
            self.stations.len(),
            self.stations.join(", "),
            self.bounds.first_date,
            self.bounds.last_date,
            self.bounds
                .last_date
                .signed_duration_since(self.bounds.first_date)
                .num_days()
                + 1,
            self.bounds.first_year,
            self.bounds.last_year,
            self.total_records,
        )
    }

    pub fn detailed_summary(&self) -> String {
        let mut lines = vec![self.summary(), String::new(), "Measurements:".to_string()];

        for c in &self.coverage {
            let range = match (c.min, c.max, c.mean) {
                (Some(min), Some(max), Some(mean)) => format!(
                    "min={:.1} max={:.1} mean={:.1} {}",
                    min,
                    max,
                    mean,
                    c.measure.unit()
                ),
                _ => "No valid measurements".to_string(),
            };
            lines.push(format!(
                "- {:<6} {:>5.1}% missing  {}",
                c.measure.column_name(),
                c.missing_percentage(),
                range
            ));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AirQualityRecord;

    #[test]
    fn test_summary_counts_absent_values() -> Result<()> {
        let records = vec![
            AirQualityRecord::new(2013, 3, 1, 0, "Dongsi").with_measure(Measure::Pm25, Some(10.0)),
            AirQualityRecord::new(2013, 3, 2, 0, "Tiantan").with_measure(Measure::Pm25, Some(30.0)),
            AirQualityRecord::new(2014, 1, 1, 0, "Dongsi"),
            AirQualityRecord::new(2014, 1, 1, 1, "Dongsi"),
        ];
        let dataset = PreparedDataset::from_records("inline", records)?;

        let summary = DatasetAnalyzer::new().summarize(&dataset)?;
        let pm25 = &summary.coverage[0];

        assert_eq!(summary.total_records, 4);
        assert_eq!(summary.stations, vec!["Dongsi", "Tiantan"]);
        assert_eq!(pm25.present, 2);
        assert_eq!(pm25.absent, 2);
        assert_eq!(pm25.missing_percentage(), 50.0);
        assert_eq!(pm25.mean, Some(20.0));
        assert_eq!(summary.coverage[5].mean, None);
        assert!(summary.detailed_summary().contains("No valid measurements"));
        Ok(())
    }

    #[test]
    fn test_empty_dataset_is_unavailable() -> Result<()> {
        let dataset = PreparedDataset::from_records("inline", Vec::new())?;
        let err = DatasetAnalyzer::new().summarize(&dataset).unwrap_err();
        assert!(matches!(err, AqError::DataUnavailable { .. }));
        Ok(())
    }
}
