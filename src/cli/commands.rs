use crate::analyzers::{station_map, wind_direction_frequency, DatasetAnalyzer};
use crate::cache::DatasetCache;
use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::models::{AirQualityRecord, GroupKey, Measure, StationReference};
use crate::processors::{
    correlate, correlation_matrix, decompose_daily, group_and_average, smoothed_daily_series,
    DatasetPreparer, GroupAverage, PreparedDataset, SelectionBounds,
};
use crate::settings::Settings;
use serde::Serialize;
use std::io::{self, Write};
use tracing::warn;

const ABSENT: &str = "n/a";

fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| ABSENT.to_string(), |v| format!("{:.2}", v))
}

/// Status line for views that produce no table
#[derive(Debug, Serialize)]
struct Notice {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    available: Option<SelectionBounds>,
}

#[derive(Debug, Serialize)]
struct PairCorrelation {
    columns: [Measure; 2],
    coefficient: Option<f64>,
}

/// Writes view results as text or as one JSON document per run
struct Printer<'w> {
    json: bool,
    out: &'w mut dyn Write,
}

impl Printer<'_> {
    fn emit<T: Serialize>(&mut self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            serde_json::to_writer_pretty(&mut *self.out, value)?;
            writeln!(self.out)?;
        } else {
            writeln!(self.out, "{}", text())?;
        }
        Ok(())
    }

    /// "No data" state for a selector outside what the dataset holds
    fn no_data(&mut self, dataset: &PreparedDataset, what: &str) -> Result<()> {
        let available = dataset.bounds();
        let message = match available {
            Some(b) => format!(
                "No data for {} (available: {} to {}, years {}-{})",
                what, b.first_date, b.last_date, b.first_year, b.last_year
            ),
            None => format!("No data for {} (dataset is empty)", what),
        };

        let notice = Notice {
            status: "no_data",
            message,
            available,
        };
        self.emit(&notice, || notice.message.clone())
    }

    /// Warnings go to stderr; JSON output also carries them as a document
    fn warning(&mut self, message: String) -> Result<()> {
        eprintln!("⚠️  {}", message);
        if self.json {
            let notice = Notice {
                status: "warning",
                message,
                available: None,
            };
            self.emit(&notice, String::new)?;
        }
        Ok(())
    }
}

fn or_pollutants(measures: Vec<Measure>) -> Vec<Measure> {
    if measures.is_empty() {
        Measure::POLLUTANTS.to_vec()
    } else {
        measures
    }
}

/// Records matching the optional year and station selectors
fn select<'a>(
    dataset: &'a PreparedDataset,
    year: Option<i32>,
    station: Option<&str>,
) -> Vec<&'a AirQualityRecord> {
    dataset
        .records()
        .iter()
        .filter(|r| year.map_or(true, |y| r.year == y))
        .filter(|r| station.map_or(true, |s| r.station.eq_ignore_ascii_case(s)))
        .collect()
}

fn selection_label(year: Option<i32>, station: Option<&str>) -> String {
    match (year, station) {
        (Some(y), Some(s)) => format!("year {} at {}", y, s),
        (Some(y), None) => format!("year {}", y),
        (None, Some(s)) => format!("station {}", s),
        (None, None) => "selection".to_string(),
    }
}

fn render_groups(key: GroupKey, rows: &[GroupAverage], measures: &[Measure]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);

    let mut header = format!("{:<14} {:>8}", key.as_str(), "records");
    for m in measures {
        header.push_str(&format!(" {:>10}", m.column_name()));
    }
    lines.push(header);

    for row in rows {
        let mut line = format!("{:<14} {:>8}", row.key.to_string(), row.records);
        for m in measures {
            line.push_str(&format!(" {:>10}", fmt_value(row.mean(*m))));
        }
        lines.push(line);
    }

    lines.join("\n")
}

pub fn run(cli: Cli, settings: Settings) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_to(cli, settings, &mut out)
}

/// Run the selected view, writing its result to `out`
pub fn run_to<W: Write>(cli: Cli, settings: Settings, out: &mut W) -> Result<()> {
    let data_path = cli.data.clone().unwrap_or_else(|| settings.data_path.clone());
    let json = cli.json;

    let preparer = DatasetPreparer::from_settings(&settings)?.with_progress(!json);
    let cache = DatasetCache::new(preparer);
    let dataset = cache.get_or_load(&data_path)?;

    let mut printer = Printer { json, out };
    let outcome = run_view(cli.command, &dataset, &settings, &mut printer);

    // Per-view analytic shortfalls degrade to a warning; everything else propagates
    match outcome {
        Err(e) if e.is_recoverable() => {
            warn!(error = %e, "view could not be computed");
            printer.warning(e.to_string())
        }
        other => other,
    }
}

fn run_view(
    command: Commands,
    dataset: &PreparedDataset,
    settings: &Settings,
    printer: &mut Printer<'_>,
) -> Result<()> {
    match command {
        Commands::Info => {
            let summary = DatasetAnalyzer::new().summarize(dataset)?;
            printer.emit(&summary, || summary.detailed_summary())?;
        }

        Commands::Day {
            date,
            measures,
            station,
        } => {
            let measures = or_pollutants(measures);
            let station = station.as_deref();
            let records: Vec<&AirQualityRecord> = dataset
                .on_date(date)
                .filter(|r| station.map_or(true, |s| r.station.eq_ignore_ascii_case(s)))
                .collect();

            if records.is_empty() {
                return printer.no_data(dataset, &date.to_string());
            }

            let rows = group_and_average(records, GroupKey::Hour, &measures);
            printer.emit(&rows, || {
                format!(
                    "Hourly averages on {}\n{}",
                    date,
                    render_groups(GroupKey::Hour, &rows, &measures)
                )
            })?;
        }

        Commands::Trend {
            by,
            measures,
            year,
            station,
        } => {
            let measures = or_pollutants(measures);
            let records = select(dataset, year, station.as_deref());
            if records.is_empty() {
                return printer.no_data(dataset, &selection_label(year, station.as_deref()));
            }

            let rows = group_and_average(records, by, &measures);
            printer.emit(&rows, || render_groups(by, &rows, &measures))?;
        }

        Commands::Correlate {
            columns,
            year,
            station,
        } => {
            let records = select(dataset, year, station.as_deref());
            if records.is_empty() {
                return printer.no_data(dataset, &selection_label(year, station.as_deref()));
            }

            if let [a, b] = columns[..] {
                let r = correlate(records.iter().copied(), a, b);
                if r.is_none() {
                    eprintln!("⚠️  Correlation of {} and {} is undefined for this selection", a, b);
                }
                let pair = PairCorrelation {
                    columns: [a, b],
                    coefficient: r,
                };
                printer.emit(&pair, || format!("r({}, {}) = {}", a, b, fmt_value(r)))?;
            } else {
                let matrix = correlation_matrix(records.iter().copied(), &columns);
                printer.emit(&matrix, || {
                    let mut lines = Vec::new();
                    let mut header = format!("{:<8}", "");
                    for m in &matrix.columns {
                        header.push_str(&format!(" {:>8}", m.column_name()));
                    }
                    lines.push(header);
                    for (m, row) in matrix.columns.iter().zip(&matrix.values) {
                        let mut line = format!("{:<8}", m.column_name());
                        for v in row {
                            line.push_str(&format!(" {:>8}", fmt_value(*v)));
                        }
                        lines.push(line);
                    }
                    lines.join("\n")
                })?;
            }
        }

        Commands::Rolling {
            measure,
            window,
            year,
            station,
        } => {
            let records = select(dataset, year, station.as_deref());
            if records.is_empty() {
                return printer.no_data(dataset, &selection_label(year, station.as_deref()));
            }

            let window = window.unwrap_or(settings.rolling_window);
            let series = smoothed_daily_series(records, measure, window)?;
            printer.emit(&series, || {
                let mut lines = vec![format!(
                    "{:<12} {:>10} {:>12}",
                    "date",
                    measure.column_name(),
                    format!("mean({}d)", window)
                )];
                for p in &series.points {
                    lines.push(format!(
                        "{:<12} {:>10} {:>12}",
                        p.date.to_string(),
                        fmt_value(p.value),
                        fmt_value(p.rolling_mean)
                    ));
                }
                lines.join("\n")
            })?;
        }

        Commands::Decompose {
            measure,
            period,
            year,
            station,
        } => {
            let records = select(dataset, year, station.as_deref());
            if records.is_empty() {
                return printer.no_data(dataset, &selection_label(year, station.as_deref()));
            }

            let period = period.unwrap_or(settings.decomposition_period);
            let result = decompose_daily(records, measure, period)?;
            printer.emit(&result, || {
                let c = &result.components;
                let mut lines = vec![format!(
                    "{:<12} {:>10} {:>10} {:>10} {:>10}",
                    "date", "observed", "trend", "seasonal", "residual"
                )];
                for (i, date) in result.dates.iter().enumerate() {
                    lines.push(format!(
                        "{:<12} {:>10.2} {:>10} {:>10.2} {:>10}",
                        date.to_string(),
                        c.observed[i],
                        fmt_value(c.trend[i]),
                        c.seasonal[i],
                        fmt_value(c.residual[i])
                    ));
                }
                lines.join("\n")
            })?;
        }

        Commands::Stations { measure, year } => {
            let records = select(dataset, year, None);
            if records.is_empty() {
                return printer.no_data(dataset, &selection_label(year, None));
            }

            let reference = StationReference::new();
            let map = station_map(records, &reference, measure);
            printer.emit(&map, || {
                let mut lines = vec![format!(
                    "{:<14} {:>9} {:>10} {:>8} {:>10}",
                    "station", "lat", "lon", "records", measure.column_name()
                )];
                for p in &map.points {
                    lines.push(format!(
                        "{:<14} {:>9.3} {:>10.3} {:>8} {:>10}",
                        p.name,
                        p.latitude,
                        p.longitude,
                        p.records,
                        fmt_value(p.mean)
                    ));
                }
                if !map.unmatched.is_empty() {
                    lines.push(format!("Without coordinates: {}", map.unmatched.join(", ")));
                }
                lines.join("\n")
            })?;
        }

        Commands::Wind {
            measure,
            year,
            station,
        } => {
            let records = select(dataset, year, station.as_deref());
            if records.is_empty() {
                return printer.no_data(dataset, &selection_label(year, station.as_deref()));
            }

            let sectors = wind_direction_frequency(records, measure);
            printer.emit(&sectors, || {
                let mut header = format!("{:<4} {:>7} {:>8} {:>7}", "wd", "deg", "count", "share");
                if let Some(m) = measure {
                    header.push_str(&format!(
                        " {:>10} {:>8} {:>8} {:>8} {:>8} {:>8}",
                        m.column_name(),
                        "min",
                        "q1",
                        "median",
                        "q3",
                        "max"
                    ));
                }
                let mut lines = vec![header];
                for s in &sectors {
                    let mut line = format!(
                        "{:<4} {:>7.1} {:>8} {:>6.1}%",
                        s.direction.code(),
                        s.degrees,
                        s.count,
                        s.frequency * 100.0
                    );
                    if measure.is_some() {
                        let d = s.distribution;
                        line.push_str(&format!(
                            " {:>10} {:>8} {:>8} {:>8} {:>8} {:>8}",
                            fmt_value(s.mean),
                            fmt_value(d.map(|d| d.min)),
                            fmt_value(d.map(|d| d.q1)),
                            fmt_value(d.map(|d| d.median)),
                            fmt_value(d.map(|d| d.q3)),
                            fmt_value(d.map(|d| d.max))
                        ));
                    }
                    lines.push(line);
                }
                lines.join("\n")
            })?;
        }
    }

    Ok(())
}
