use chrono::{Month, Weekday};
use tracing::debug;

use crate::dataset::TripSet;
use crate::error::Result;
use crate::reports::types::TimeReport;
use crate::reports::utility::mode_by;

/// Finds the busiest month, day of week and start hour.
///
/// Ties go to the earliest value: lowest month number, the weekday closest
/// to Monday, lowest hour.
///
/// # Errors
///
/// `EmptyInput` if there are no trips.
#[tracing::instrument(skip_all, fields(dataset = %trips.dataset(), trips = trips.len()))]
pub fn summarize_time(trips: &TripSet) -> Result<TimeReport> {
    trips.require_records("time")?;
    let records = trips.records();

    // Non-empty input always has a mode; the fallbacks are never taken.
    let busiest_month = mode_by(records.iter().map(|t| t.month), |m| m.number_from_month())
        .unwrap_or(Month::January);
    let busiest_day_of_week = mode_by(records.iter().map(|t| t.day_of_week), |d| {
        d.num_days_from_monday()
    })
    .unwrap_or(Weekday::Mon);
    let busiest_hour = mode_by(records.iter().map(|t| t.hour), |h| *h).unwrap_or_default();

    debug!(
        month = busiest_month.name(),
        day = ?busiest_day_of_week,
        hour = busiest_hour,
        "Time report computed"
    );

    Ok(TimeReport {
        busiest_month,
        busiest_day_of_week,
        busiest_hour,
    })
}
