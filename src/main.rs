//! CLI entry point for the bikeshare statistics tool.
//!
//! Loads one city's trips, narrows them by month and day, and prints the
//! travel-time, station, duration and rider summaries.

use anyhow::Result;
use bikeshare_stats::output::{print_pretty, write_json, write_rows, write_text};
use bikeshare_stats::reports::summarize_all;
use bikeshare_stats::{DatasetCatalog, DatasetId, DayConstraint, FilterRequest, MonthConstraint};
use clap::{Parser, ValueEnum};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bikeshare_stats")]
#[command(about = "Explore US bikeshare trip data", long_about = None)]
struct Cli {
    /// City to analyze: chicago, "new york city" or washington
    #[arg(value_name = "CITY")]
    city: DatasetId,

    /// Month to filter on, January through June, or "all"
    #[arg(short, long, default_value = "all")]
    month: MonthConstraint,

    /// Day of the week to filter on, or "all"
    #[arg(short, long, default_value = "all")]
    day: DayConstraint,

    /// Directory holding the city CSV files (defaults to $BIKESHARE_DATA_DIR, then ".")
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// JSON file mapping city names to CSV paths (defaults to $BIKESHARE_CATALOG)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Output format for the summary
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Also print the first N filtered trips as CSV
    #[arg(long, value_name = "N")]
    raw: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bikeshare_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bikeshare_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let data_dir = cli
        .data_dir
        .or_else(|| std::env::var_os("BIKESHARE_DATA_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let catalog_path = cli
        .catalog
        .or_else(|| std::env::var_os("BIKESHARE_CATALOG").map(PathBuf::from));

    let catalog = match catalog_path {
        Some(path) => DatasetCatalog::load(data_dir, &path)?,
        None => DatasetCatalog::new(data_dir),
    };
    for (dataset, path) in catalog.iter() {
        debug!(dataset = %dataset, path = %path.display(), "Catalog entry");
    }

    let request = FilterRequest::unconstrained(cli.city)
        .with_month(cli.month)
        .with_day(cli.day);

    let trips = bikeshare_stats::load(&catalog, &request)?;
    info!(dataset = %request.dataset, trips = trips.len(), "Trips selected");

    let summary = summarize_all(&trips);
    for outcome in [
        summary.time.as_ref().err(),
        summary.stations.as_ref().err(),
        summary.duration.as_ref().err(),
        summary.demographics.as_ref().err(),
    ]
    .into_iter()
    .flatten()
    {
        error!(error = %outcome, "Report failed");
    }
    print_pretty(&summary);

    let stdout = std::io::stdout().lock();
    match cli.format {
        Format::Text => write_text(stdout, &request, &trips, &summary)?,
        Format::Json => write_json(stdout, &request, &trips, &summary)?,
    }

    if let Some(limit) = cli.raw {
        write_rows(std::io::stdout().lock(), trips.records(), limit)?;
    }

    Ok(())
}
