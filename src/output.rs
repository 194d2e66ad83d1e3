//! Output formatting for reports and raw trips.
//!
//! Supports a plain-text summary, JSON serialization, and CSV export of the
//! filtered rows.

use std::io::Write;

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::dataset::{TripRecord, TripSet};
use crate::error::BikeshareError;
use crate::filter::{FilterRequest, weekday_name};
use crate::reports::Summary;
use crate::reports::types::{BirthYears, CategoryCount, DemographicsReport};

const RULE: &str = "----------------------------------------";

/// Logs the summary using Rust's debug pretty-print format.
pub fn print_pretty(summary: &Summary) {
    debug!("{:#?}", summary);
}

/// Writes the summary as pretty-printed JSON. A failed report appears as
/// `{"error": "..."}` in place of its fields.
pub fn write_json<W: Write>(
    mut writer: W,
    request: &FilterRequest,
    trips: &TripSet,
    summary: &Summary,
) -> Result<()> {
    let document = json!({
        "dataset": request.dataset,
        "month": request.month.to_string(),
        "day": request.day.to_string(),
        "trips": trips.len(),
        "time": section(&summary.time)?,
        "stations": section(&summary.stations)?,
        "duration": section(&summary.duration)?,
        "demographics": section(&summary.demographics)?,
    });
    serde_json::to_writer_pretty(&mut writer, &document)?;
    writeln!(writer)?;
    Ok(())
}

fn section<T: Serialize>(report: &Result<T, BikeshareError>) -> Result<Value> {
    Ok(match report {
        Ok(report) => serde_json::to_value(report)?,
        Err(e) => json!({ "error": e.to_string() }),
    })
}

/// Writes the summary as human-readable text, one section per report.
pub fn write_text<W: Write>(
    mut w: W,
    request: &FilterRequest,
    trips: &TripSet,
    summary: &Summary,
) -> Result<()> {
    writeln!(
        w,
        "{} trips in {} (month: {}, day: {})",
        trips.len(),
        request.dataset,
        request.month,
        request.day
    )?;
    writeln!(w, "{RULE}")?;

    writeln!(w, "Most Frequent Times of Travel")?;
    match &summary.time {
        Ok(time) => {
            writeln!(w, "  Most common month: {}", time.busiest_month.name())?;
            writeln!(w, "  Most common day: {}", weekday_name(time.busiest_day_of_week))?;
            writeln!(w, "  Most common start hour: {}", time.busiest_hour)?;
        }
        Err(e) => writeln!(w, "  Not available: {e}")?,
    }
    writeln!(w, "{RULE}")?;

    writeln!(w, "Most Popular Stations and Trip")?;
    match &summary.stations {
        Ok(stations) => {
            writeln!(w, "  Most common start station: {}", stations.busiest_start_station)?;
            writeln!(w, "  Most common end station: {}", stations.busiest_end_station)?;
            writeln!(w, "  Most common trip: {}", stations.busiest_route)?;
        }
        Err(e) => writeln!(w, "  Not available: {e}")?,
    }
    writeln!(w, "{RULE}")?;

    writeln!(w, "Trip Duration")?;
    match &summary.duration {
        Ok(duration) => {
            writeln!(w, "  Total travel time: {:.2} hours", duration.total_hours)?;
            writeln!(w, "  Mean travel time: {:.2} minutes", duration.mean_minutes)?;
        }
        Err(e) => writeln!(w, "  Not available: {e}")?,
    }
    writeln!(w, "{RULE}")?;

    writeln!(w, "User Stats")?;
    match &summary.demographics {
        Ok(demographics) => write_demographics(&mut w, demographics)?,
        Err(e) => writeln!(w, "  Not available: {e}")?,
    }
    writeln!(w, "{RULE}")?;

    Ok(())
}

fn write_demographics<W: Write>(w: &mut W, report: &DemographicsReport) -> Result<()> {
    match &report.user_type_counts {
        Some(counts) => write_counts(w, "User types", counts)?,
        None => writeln!(w, "  User type data not available.")?,
    }
    match &report.gender_counts {
        Some(counts) => write_counts(w, "Gender breakdown", counts)?,
        None => writeln!(w, "  Gender data not available.")?,
    }
    match &report.birth_year {
        Some(BirthYears::Stats(years)) => {
            writeln!(w, "  Earliest year of birth: {}", years.min)?;
            writeln!(w, "  Most recent year of birth: {}", years.max)?;
            writeln!(w, "  Most common year of birth: {}", years.mode)?;
        }
        Some(BirthYears::NoValues) => {
            writeln!(w, "  No birth-year values in the selected trips.")?
        }
        None => writeln!(w, "  Birth year data not available.")?,
    }
    Ok(())
}

fn write_counts<W: Write>(w: &mut W, title: &str, counts: &[CategoryCount]) -> Result<()> {
    writeln!(w, "  {title}:")?;
    let width = counts.iter().map(|c| c.category.len()).max().unwrap_or(0);
    for c in counts {
        writeln!(w, "    {:<width$}  {}", c.category, c.count)?;
    }
    Ok(())
}

/// Writes up to `limit` trips as CSV rows, with a header.
pub fn write_rows<W: Write>(writer: W, records: &[TripRecord], limit: usize) -> Result<()> {
    debug!(limit, available = records.len(), "Writing raw rows");

    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for record in records.iter().take(limit) {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}
