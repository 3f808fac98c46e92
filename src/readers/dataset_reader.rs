use crate::error::{AqError, Result};
use crate::models::{AirQualityRecord, Measure, WindDirection};
use crate::utils::constants::{
    COL_DAY, COL_HOUR, COL_MONTH, COL_STATION, COL_WIND_DIRECTION, COL_YEAR, DEFAULT_BUFFER_SIZE,
    DEFAULT_DELIMITER, MISSING_TOKENS,
};
use crate::utils::progress::ProgressReporter;
use csv::{ReaderBuilder, StringRecord, Trim};
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;
use validator::Validate;

const PROGRESS_EVERY: usize = 50_000;

/// Positions of the required columns within the header row
#[derive(Debug, Clone)]
struct ColumnIndex {
    year: usize,
    month: usize,
    day: usize,
    hour: usize,
    station: usize,
    wd: usize,
    measures: Vec<(Measure, usize)>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> std::result::Result<Self, String> {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}'))
            .collect();

        let mut missing = Vec::new();
        let mut find = |column: &str| -> usize {
            match names.iter().position(|n| *n == column) {
                Some(index) => index,
                None => {
                    missing.push(column.to_string());
                    usize::MAX
                }
            }
        };

        let year = find(COL_YEAR);
        let month = find(COL_MONTH);
        let day = find(COL_DAY);
        let hour = find(COL_HOUR);
        let station = find(COL_STATION);
        let wd = find(COL_WIND_DIRECTION);
        let measures = Measure::ALL
            .iter()
            .map(|m| (*m, find(m.column_name())))
            .collect();

        if !missing.is_empty() {
            return Err(format!("missing required columns: {}", missing.join(", ")));
        }

        Ok(Self {
            year,
            month,
            day,
            hour,
            station,
            wd,
            measures,
        })
    }
}

/// Reads the hourly air-quality table from a delimited file
pub struct DatasetReader {
    delimiter: u8,
    use_mmap: bool,
}

impl DatasetReader {
    pub fn new() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER as u8,
            use_mmap: false,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Read every row of the file. Any failure, including a single bad row,
    /// is reported as `DataUnavailable` and no records are returned.
    pub fn read_records(
        &self,
        path: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<AirQualityRecord>> {
        let result = if self.use_mmap {
            self.read_mmap(path, progress)
        } else {
            self.read_buffered(path, progress)
        };

        result.map_err(|e| match e {
            AqError::DataUnavailable { .. } => e,
            other => AqError::data_unavailable(path, other.to_string()),
        })
    }

    fn read_buffered(
        &self,
        path: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<AirQualityRecord>> {
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        self.read_from(reader, path, progress)
    }

    fn read_mmap(
        &self,
        path: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<AirQualityRecord>> {
        let file = File::open(path)?;
        // The file is treated as read-only for the lifetime of the map
        let mmap = unsafe { Mmap::map(&file)? };
        self.read_from(&mmap[..], path, progress)
    }

    /// Parse records from any byte source; `path` only labels errors
    pub fn read_from<R: Read>(
        &self,
        source: R,
        path: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<AirQualityRecord>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(source);

        let headers = reader.headers()?.clone();
        let columns = ColumnIndex::from_headers(&headers)
            .map_err(|reason| AqError::data_unavailable(path, reason))?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);

            let record = parse_row(&row, &columns)
                .map_err(|reason| AqError::data_unavailable(path, format!("line {}: {}", line, reason)))?;
            records.push(record);

            if let Some(p) = progress {
                if records.len() % PROGRESS_EVERY == 0 {
                    p.set_message(&format!("Read {} rows...", records.len()));
                }
            }
        }

        debug!(rows = records.len(), path = %path.display(), "parsed dataset rows");
        Ok(records)
    }
}

impl Default for DatasetReader {
    fn default() -> Self {
        Self::new()
    }
}

fn field<'a>(row: &'a StringRecord, index: usize) -> &'a str {
    row.get(index).unwrap_or("")
}

fn is_missing(value: &str) -> bool {
    MISSING_TOKENS.contains(&value)
}

fn parse_integer<T: FromStr>(row: &StringRecord, index: usize, column: &str) -> std::result::Result<T, String> {
    let raw = field(row, index);
    raw.parse::<T>()
        .map_err(|_| format!("invalid {} '{}'", column, raw))
}

fn parse_measure(raw: &str, measure: Measure) -> std::result::Result<Option<f64>, String> {
    if is_missing(raw) {
        return Ok(None);
    }

    let value = raw
        .parse::<f64>()
        .map_err(|_| format!("invalid {} '{}'", measure, raw))?;

    if !value.is_finite() {
        return Err(format!("non-finite {} '{}'", measure, raw));
    }

    Ok(Some(value))
}

fn parse_row(row: &StringRecord, columns: &ColumnIndex) -> std::result::Result<AirQualityRecord, String> {
    let year: i32 = parse_integer(row, columns.year, COL_YEAR)?;
    let month: u32 = parse_integer(row, columns.month, COL_MONTH)?;
    let day: u32 = parse_integer(row, columns.day, COL_DAY)?;
    let hour: u32 = parse_integer(row, columns.hour, COL_HOUR)?;

    let station = field(row, columns.station);
    if station.is_empty() {
        return Err("empty station name".to_string());
    }

    let mut record = AirQualityRecord::new(year, month, day, hour, station);

    let wd = field(row, columns.wd);
    if !is_missing(wd) {
        record.wd = Some(WindDirection::from_str(wd).map_err(|e| e.to_string())?);
    }

    for (measure, index) in &columns.measures {
        record.set(*measure, parse_measure(field(row, *index), *measure)?);
    }

    record.validate().map_err(|e| e.to_string())?;

    if record.calendar_date().is_none() {
        return Err(format!("invalid calendar date {}-{}-{}", year, month, day));
    }

    Ok(record)
}
