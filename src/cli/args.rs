use crate::models::{GroupKey, Measure};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

fn parse_measure(s: &str) -> Result<Measure, String> {
    s.parse().map_err(|e: crate::error::AqError| e.to_string())
}

fn parse_group_key(s: &str) -> Result<GroupKey, String> {
    s.parse().map_err(|e: crate::error::AqError| e.to_string())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

#[derive(Parser)]
#[command(name = "aq-dataset")]
#[command(about = "Prepare hourly air-quality station data for dashboard views")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Settings file [default: ./aq-dataset.toml]")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Input dataset (overrides settings)")]
    pub data: Option<PathBuf>,

    #[arg(long, global = true, help = "Print JSON instead of text")]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize the dataset: stations, date range, missing values
    Info,

    /// Hourly averages for one calendar day
    Day {
        #[arg(long, value_parser = parse_date, help = "Calendar date (YYYY-MM-DD)")]
        date: NaiveDate,

        #[arg(short, long, value_parser = parse_measure, value_delimiter = ',', help = "Columns [default: all pollutants]")]
        measures: Vec<Measure>,

        #[arg(short, long)]
        station: Option<String>,
    },

    /// Averages grouped by hour, weekday, month, year or station
    Trend {
        #[arg(long, value_parser = parse_group_key, default_value = "month")]
        by: GroupKey,

        #[arg(short, long, value_parser = parse_measure, value_delimiter = ',', help = "Columns [default: all pollutants]")]
        measures: Vec<Measure>,

        #[arg(short, long)]
        year: Option<i32>,

        #[arg(short, long)]
        station: Option<String>,
    },

    /// Pearson correlation of two columns, or a matrix for more than two
    Correlate {
        #[arg(value_parser = parse_measure, num_args = 2.., required = true)]
        columns: Vec<Measure>,

        #[arg(short, long)]
        year: Option<i32>,

        #[arg(short, long)]
        station: Option<String>,
    },

    /// Daily means with a trailing rolling mean
    Rolling {
        #[arg(short, long, value_parser = parse_measure, default_value = "PM2.5")]
        measure: Measure,

        #[arg(short, long, help = "Window in days [default: from settings]")]
        window: Option<usize>,

        #[arg(short, long)]
        year: Option<i32>,

        #[arg(short, long)]
        station: Option<String>,
    },

    /// Additive seasonal decomposition of the daily series
    Decompose {
        #[arg(short, long, value_parser = parse_measure, default_value = "PM2.5")]
        measure: Measure,

        #[arg(short, long, help = "Seasonal period in days [default: from settings]")]
        period: Option<usize>,

        #[arg(short, long)]
        year: Option<i32>,

        #[arg(short, long)]
        station: Option<String>,
    },

    /// Per-station means joined with station coordinates
    Stations {
        #[arg(short, long, value_parser = parse_measure, default_value = "PM2.5")]
        measure: Measure,

        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Wind direction frequencies, optionally with a mean per sector
    Wind {
        #[arg(short, long, value_parser = parse_measure)]
        measure: Option<Measure>,

        #[arg(short, long)]
        year: Option<i32>,

        #[arg(short, long)]
        station: Option<String>,
    },
}
