use crate::error::{AqError, Result};
use crate::models::{AirQualityRecord, GroupKey, Measure};
use crate::processors::aggregation::{group_and_average, GroupAverage};
use crate::processors::correlation::{correlate, correlation_matrix, CorrelationMatrix};
use crate::processors::resample::{forward_fill, resample_daily, DailyValue};
use crate::processors::rolling::rolling_mean;
use crate::processors::seasonal::{seasonal_decompose, Decomposition};
use crate::processors::temporal::{
    date_bounds, derive_temporal_fields, filter_by_date, filter_by_station, filter_by_year,
    year_bounds,
};
use crate::readers::DatasetReader;
use crate::settings::Settings;
use crate::utils::progress::ProgressReporter;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Loads a source file and produces a fully derived, read-only dataset
pub struct DatasetPreparer {
    reader: DatasetReader,
    show_progress: bool,
}

impl DatasetPreparer {
    pub fn new() -> Self {
        Self {
            reader: DatasetReader::new(),
            show_progress: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            reader: DatasetReader::new()
                .with_delimiter(settings.delimiter_byte()?)
                .with_mmap(settings.use_mmap),
            show_progress: false,
        })
    }

    pub fn with_reader(mut self, reader: DatasetReader) -> Self {
        self.reader = reader;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Parse and derive the whole file. Every failure surfaces as
    /// `DataUnavailable`; nothing is returned unless all rows succeeded.
    pub fn load(&self, path: &Path) -> Result<PreparedDataset> {
        let started = Instant::now();
        let progress = ProgressReporter::new_spinner(
            &format!("Loading {}...", path.display()),
            !self.show_progress,
        );

        let records = self.reader.read_records(path, Some(&progress))?;
        let dataset = PreparedDataset::from_records(path, records)
            .map_err(|e| AqError::data_unavailable(path, e.to_string()))?;

        progress.finish_and_clear();
        info!(
            path = %path.display(),
            records = dataset.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dataset prepared"
        );

        Ok(dataset)
    }
}

impl Default for DatasetPreparer {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of one view's date and year selectors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionBounds {
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub first_year: i32,
    pub last_year: i32,
}

impl SelectionBounds {
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        (self.first_date..=self.last_date).contains(&date)
    }

    pub fn contains_year(&self, year: i32) -> bool {
        (self.first_year..=self.last_year).contains(&year)
    }
}

/// Prepared record table shared read-only by every view
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    source: PathBuf,
    records: Vec<AirQualityRecord>,
}

impl PreparedDataset {
    /// Wrap in-memory records, deriving temporal fields where missing
    pub fn from_records(source: impl Into<PathBuf>, mut records: Vec<AirQualityRecord>) -> Result<Self> {
        let derived = derive_temporal_fields(&mut records)?;
        debug!(derived, "derived temporal fields");

        Ok(Self {
            source: source.into(),
            records,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn records(&self) -> &[AirQualityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn bounds(&self) -> Option<SelectionBounds> {
        let (first_date, last_date) = date_bounds(&self.records)?;
        let (first_year, last_year) = year_bounds(&self.records)?;
        Some(SelectionBounds {
            first_date,
            last_date,
            first_year,
            last_year,
        })
    }

    pub fn stations(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.records.iter().map(|r| r.station.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn on_date(&self, date: NaiveDate) -> impl Iterator<Item = &AirQualityRecord> {
        filter_by_date(&self.records, date)
    }

    pub fn in_year(&self, year: i32) -> impl Iterator<Item = &AirQualityRecord> {
        filter_by_year(&self.records, year)
    }

    pub fn at_station<'a>(&'a self, station: &'a str) -> impl Iterator<Item = &'a AirQualityRecord> + 'a {
        filter_by_station(&self.records, station)
    }

    pub fn group_and_average(&self, key: GroupKey, columns: &[Measure]) -> Vec<GroupAverage> {
        group_and_average(&self.records, key, columns)
    }

    pub fn correlate(&self, a: Measure, b: Measure) -> Option<f64> {
        correlate(&self.records, a, b)
    }

    pub fn correlation_matrix(&self, columns: &[Measure]) -> CorrelationMatrix {
        correlation_matrix(&self.records, columns)
    }

    pub fn daily_series(&self, measure: Measure) -> Vec<DailyValue> {
        resample_daily(&self.records, measure)
    }
}

/// Daily series smoothed with a trailing window, aligned with its dates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothedSeries {
    pub measure: Measure,
    pub window: usize,
    pub points: Vec<SmoothedPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothedPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
    pub rolling_mean: Option<f64>,
}

/// Daily means of `measure` with their trailing rolling mean
pub fn smoothed_daily_series<'a, I>(records: I, measure: Measure, window: usize) -> Result<SmoothedSeries>
where
    I: IntoIterator<Item = &'a AirQualityRecord>,
{
    let daily = resample_daily(records, measure);
    let smoothed = rolling_mean(daily.iter().map(|d| d.value), window)?;

    let points = daily
        .iter()
        .zip(smoothed)
        .map(|(d, rolling_mean)| SmoothedPoint {
            date: d.date,
            value: d.value,
            rolling_mean,
        })
        .collect();

    Ok(SmoothedSeries {
        measure,
        window,
        points,
    })
}

/// Seasonal decomposition of the forward-filled daily series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyDecomposition {
    pub measure: Measure,
    pub dates: Vec<NaiveDate>,
    pub components: Decomposition,
}

/// Resample `measure` to days, forward-fill gaps, drop the leading absent
/// stretch and decompose with the given period.
pub fn decompose_daily<'a, I>(records: I, measure: Measure, period: usize) -> Result<DailyDecomposition>
where
    I: IntoIterator<Item = &'a AirQualityRecord>,
{
    let daily = resample_daily(records, measure);
    let values: Vec<Option<f64>> = daily.iter().map(|d| d.value).collect();
    let filled = forward_fill(&values);

    let start = filled.iter().position(Option::is_some).unwrap_or(filled.len());
    let observed: Vec<f64> = filled[start..].iter().flatten().copied().collect();
    let dates = daily[start..].iter().map(|d| d.date).collect();

    let components = seasonal_decompose(&observed, period)?;

    Ok(DailyDecomposition {
        measure,
        dates,
        components,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str =
        "No,year,month,day,hour,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DEWP,RAIN,wd,WSPM,station";

    fn dataset_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "1,2013,3,1,0,10,20,4,7,300,77,-0.7,1023,-18.8,0,NNW,4.4,Dongsi").unwrap();
        writeln!(file, "2,2013,3,1,0,20,30,4,7,300,77,-1.1,1023,-18.2,0,N,4.7,Tiantan").unwrap();
        writeln!(file, "3,2013,3,1,1,NA,40,4,7,300,77,-1.1,1023,-18.2,0,N,4.7,Dongsi").unwrap();
        writeln!(file, "4,2013,3,2,0,30,NA,4,7,300,77,-1.1,1023,-18.2,0,E,4.7,Dongsi").unwrap();
        writeln!(file, "5,2014,3,2,0,NA,NA,4,7,300,77,-1.1,1023,-18.2,0,E,4.7,Dongsi").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_derives_fields() -> Result<()> {
        let file = dataset_file();
        let dataset = DatasetPreparer::new().load(file.path())?;

        assert_eq!(dataset.len(), 5);
        assert!(dataset.records().iter().all(|r| r.has_derived_fields()));
        assert_eq!(dataset.stations(), vec!["Dongsi", "Tiantan"]);
        Ok(())
    }

    #[test]
    fn test_hourly_average_on_date() -> Result<()> {
        let file = dataset_file();
        let dataset = DatasetPreparer::new().load(file.path())?;
        let date = NaiveDate::from_ymd_opt(2013, 3, 1).unwrap();

        let rows = group_and_average(dataset.on_date(date), GroupKey::Hour, &[Measure::Pm25]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].mean(Measure::Pm25), Some(15.0));
        assert_eq!(rows[1].mean(Measure::Pm25), None);
        Ok(())
    }

    #[test]
    fn test_bounds() -> Result<()> {
        let file = dataset_file();
        let dataset = DatasetPreparer::new().load(file.path())?;
        let bounds = dataset.bounds().unwrap();

        assert_eq!(bounds.first_year, 2013);
        assert_eq!(bounds.last_year, 2014);
        assert!(bounds.contains_date(NaiveDate::from_ymd_opt(2013, 12, 31).unwrap()));
        assert!(!bounds.contains_year(2015));
        Ok(())
    }

    #[test]
    fn test_smoothed_series_aligns_dates() -> Result<()> {
        let records: Vec<AirQualityRecord> = (1..=5)
            .map(|day| {
                AirQualityRecord::new(2013, 3, day, 0, "Dongsi")
                    .with_measure(Measure::Pm25, Some(day as f64))
            })
            .collect();

        let series = smoothed_daily_series(&records, Measure::Pm25, 3)?;
        let rolling: Vec<_> = series.points.iter().map(|p| p.rolling_mean).collect();

        assert_eq!(rolling, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
        assert_eq!(series.points[4].date, NaiveDate::from_ymd_opt(2013, 3, 5).unwrap());
        Ok(())
    }

    #[test]
    fn test_decompose_daily_skips_leading_gap() -> Result<()> {
        let mut records = vec![AirQualityRecord::new(2013, 3, 1, 0, "Dongsi")];
        for day in 2..=16 {
            records.push(
                AirQualityRecord::new(2013, 3, day, 0, "Dongsi")
                    .with_measure(Measure::O3, Some(40.0 + (day % 7) as f64)),
            );
        }

        let result = decompose_daily(&records, Measure::O3, 7)?;

        assert_eq!(result.dates.len(), 15);
        assert_eq!(result.dates[0], NaiveDate::from_ymd_opt(2013, 3, 2).unwrap());
        assert_eq!(result.components.observed.len(), 15);
        Ok(())
    }

    #[test]
    fn test_decompose_daily_insufficient() {
        let records: Vec<AirQualityRecord> = (1..=10)
            .map(|day| {
                AirQualityRecord::new(2013, 3, day, 0, "Dongsi").with_measure(Measure::O3, Some(1.0))
            })
            .collect();

        let err = decompose_daily(&records, Measure::O3, 7).unwrap_err();
        assert!(err.is_recoverable());
    }
}
