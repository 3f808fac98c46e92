use aq_dataset::cli::{run, run_to, Cli};
use aq_dataset::models::{AirQualityRecord, GroupKey, Measure};
use aq_dataset::processors::{
    derive_temporal_fields, group_and_average, rolling_mean, DatasetPreparer,
};
use aq_dataset::{AqError, DatasetCache, Settings};
use chrono::NaiveDate;
use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const HEADER: &str =
    "No,year,month,day,hour,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DEWP,RAIN,wd,WSPM,station";

/// Three weeks of hourly rows for two stations with a weekly PM2.5 cycle
fn write_sample_dataset(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("air_quality.csv");
    let mut file = std::fs::File::create(&path).expect("create dataset");
    writeln!(file, "{}", HEADER).unwrap();

    let start = NaiveDate::from_ymd_opt(2015, 6, 1).unwrap();
    let mut row = 1;
    for offset in 0..21 {
        let date = start + chrono::Duration::days(offset);
        for hour in [0u32, 12] {
            for (station, shift) in [("Dongsi", 0.0), ("Huairou", -10.0)] {
                let pm25 = 50.0 + (offset % 7) as f64 * 5.0 + shift;
                let temp = 20.0 + hour as f64 / 2.0;
                writeln!(
                    file,
                    "{},{},{},{},{},{},{},5,30,600,{},{},1005,12,0,NE,2.1,{}",
                    row,
                    date.format("%Y"),
                    date.format("%-m"),
                    date.format("%-d"),
                    hour,
                    pm25,
                    pm25 * 1.5,
                    2.0 * temp,
                    temp,
                    station
                )
                .unwrap();
                row += 1;
            }
        }
    }

    path
}

#[test]
fn test_load_and_group_end_to_end() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = write_sample_dataset(&dir);

    let dataset = DatasetPreparer::new().load(&path).unwrap();
    assert_eq!(dataset.len(), 21 * 2 * 2);

    let by_station = dataset.group_and_average(GroupKey::Station, &[Measure::Pm25]);
    assert_eq!(by_station.len(), 2);
    let dongsi = by_station[0].mean(Measure::Pm25).unwrap();
    let huairou = by_station[1].mean(Measure::Pm25).unwrap();
    assert!((dongsi - huairou - 10.0).abs() < 1e-9);

    let by_weekday = dataset.group_and_average(GroupKey::Weekday, &[Measure::Pm25]);
    assert_eq!(by_weekday.len(), 7);

    let bounds = dataset.bounds().unwrap();
    assert_eq!(bounds.first_date, NaiveDate::from_ymd_opt(2015, 6, 1).unwrap());
    assert_eq!(bounds.last_date, NaiveDate::from_ymd_opt(2015, 6, 21).unwrap());
}

#[test]
fn test_correlation_of_linear_columns() {
    let dir = TempDir::new().unwrap();
    let path = write_sample_dataset(&dir);
    let dataset = DatasetPreparer::new().load(&path).unwrap();

    // O3 was written as exactly twice TEMP
    let r = dataset.correlate(Measure::Temp, Measure::O3).unwrap();
    assert!((r - 1.0).abs() < 1e-9);
}

#[test]
fn test_filter_by_absent_date_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = write_sample_dataset(&dir);
    let dataset = DatasetPreparer::new().load(&path).unwrap();

    let date = NaiveDate::from_ymd_opt(1999, 1, 1).unwrap();
    assert_eq!(dataset.on_date(date).count(), 0);
}

#[test]
fn test_documented_five_row_example() {
    let mut records = vec![
        AirQualityRecord::new(2013, 3, 1, 0, "Dongsi").with_measure(Measure::Pm25, Some(10.0)),
        AirQualityRecord::new(2013, 3, 1, 0, "Tiantan").with_measure(Measure::Pm25, Some(20.0)),
        AirQualityRecord::new(2013, 3, 1, 1, "Dongsi").with_measure(Measure::Pm25, None),
        AirQualityRecord::new(2013, 3, 1, 1, "Tiantan").with_measure(Measure::Pm25, Some(8.0)),
        AirQualityRecord::new(2013, 3, 1, 2, "Dongsi"),
    ];
    derive_temporal_fields(&mut records).unwrap();
    let snapshot = records.clone();
    derive_temporal_fields(&mut records).unwrap();
    assert_eq!(records, snapshot);

    let rows = group_and_average(&records, GroupKey::Hour, &[Measure::Pm25]);

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].mean(Measure::Pm25), Some(15.0));
    assert_eq!(rows[1].mean(Measure::Pm25), Some(8.0));
    assert_eq!(rows[2].mean(Measure::Pm25), None);
}

#[test]
fn test_rolling_mean_example() {
    let series = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)];
    let smoothed: Vec<_> = rolling_mean(series, 3).unwrap().collect();
    assert_eq!(smoothed, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
}

#[test]
fn test_missing_column_leaves_no_cache_entry() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "year,month,day,hour,PM2.5,station").unwrap();
    writeln!(file, "2013,3,1,0,10,Dongsi").unwrap();
    file.flush().unwrap();

    let cache = DatasetCache::default();
    let err = cache.get_or_load(file.path()).unwrap_err();

    assert!(matches!(err, AqError::DataUnavailable { .. }));
    assert!(cache.get(file.path()).is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_cli_views_run_against_dataset() {
    let dir = TempDir::new().unwrap();
    let path = write_sample_dataset(&dir);
    let data = path.to_str().unwrap();

    let views: [&[&str]; 8] = [
        &["info"],
        &["day", "--date", "2015-06-03"],
        &["day", "--date", "2001-01-01"],
        &["trend", "--by", "weekday", "-m", "PM2.5,TEMP"],
        &["correlate", "TEMP", "O3", "PM10"],
        &["rolling", "-m", "PM10", "-w", "3"],
        &["stations", "-m", "PM2.5"],
        &["wind", "-m", "CO", "--year", "2015"],
    ];

    for view in views {
        let mut argv = vec!["aq-dataset", "--data", data, "--json"];
        argv.extend_from_slice(view);
        let cli = Cli::try_parse_from(argv).unwrap();
        run(cli, Settings::default()).unwrap();
    }
}

/// Run one CLI invocation with `--json` and parse what it wrote
fn run_json(data: &std::path::Path, view: &[&str]) -> Value {
    let mut argv = vec!["aq-dataset", "--data", data.to_str().unwrap(), "--json"];
    argv.extend_from_slice(view);
    let cli = Cli::try_parse_from(argv).unwrap();

    let mut out = Vec::new();
    run_to(cli, Settings::default(), &mut out).unwrap();
    serde_json::from_slice(&out).expect("stdout is a single JSON document")
}

#[test]
fn test_json_views_report_content() {
    let dir = TempDir::new().unwrap();
    let path = write_sample_dataset(&dir);

    let weekdays = run_json(&path, &["trend", "--by", "weekday", "-m", "PM2.5"]);
    let rows = weekdays.as_array().unwrap();
    assert_eq!(rows.len(), 7);
    assert_eq!(rows[0]["key"], 0);
    assert_eq!(rows[0]["records"], 12);

    let pair = run_json(&path, &["correlate", "TEMP", "O3"]);
    assert_eq!(pair["columns"], serde_json::json!(["TEMP", "O3"]));
    assert!((pair["coefficient"].as_f64().unwrap() - 1.0).abs() < 1e-9);

    let wind = run_json(&path, &["wind", "-m", "PM2.5"]);
    let ne = &wind.as_array().unwrap()[2];
    assert_eq!(ne["direction"], "NE");
    assert_eq!(ne["count"], 84);
    assert_eq!(ne["distribution"]["min"], 40.0);
    assert_eq!(ne["distribution"]["max"], 80.0);
}

#[test]
fn test_json_output_stays_valid_without_results() {
    let dir = TempDir::new().unwrap();
    let path = write_sample_dataset(&dir);

    let empty = run_json(&path, &["day", "--date", "2001-01-01"]);
    assert_eq!(empty["status"], "no_data");
    assert_eq!(empty["available"]["first_date"], "2015-06-01");

    // SO2 is constant in the sample, so its correlation is undefined
    let undefined = run_json(&path, &["correlate", "SO2", "O3"]);
    assert_eq!(undefined["coefficient"], Value::Null);

    let short = run_json(&path, &["decompose", "-m", "PM2.5", "-p", "30"]);
    assert_eq!(short["status"], "warning");
    assert!(short["message"].as_str().unwrap().contains("seasonal decomposition"));
}

#[test]
fn test_short_series_decomposition_degrades_to_warning() {
    let dir = TempDir::new().unwrap();
    let path = write_sample_dataset(&dir);

    // 21 days cannot hold two 30-day periods
    let cli = Cli::try_parse_from([
        "aq-dataset",
        "--data",
        path.to_str().unwrap(),
        "decompose",
        "-m",
        "PM2.5",
        "-p",
        "30",
    ])
    .unwrap();

    assert!(run(cli, Settings::default()).is_ok());
}

#[test]
fn test_cli_reports_missing_source() {
    let cli = Cli::try_parse_from(["aq-dataset", "--data", "/no/such/file.csv", "info"]).unwrap();
    let err = run(cli, Settings::default()).unwrap_err();
    assert!(matches!(err, AqError::DataUnavailable { .. }));
}
