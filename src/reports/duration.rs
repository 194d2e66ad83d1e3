use tracing::debug;

use crate::dataset::TripSet;
use crate::error::Result;
use crate::reports::types::DurationReport;
use crate::reports::utility::mean;

const SECONDS_PER_HOUR: f64 = 3600.0;
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Sums and averages trip durations.
///
/// Durations are taken as recorded; zero or negative values are not
/// filtered out.
///
/// # Errors
///
/// `EmptyInput` if there are no trips.
#[tracing::instrument(skip_all, fields(dataset = %trips.dataset(), trips = trips.len()))]
pub fn summarize_duration(trips: &TripSet) -> Result<DurationReport> {
    trips.require_records("duration")?;

    let seconds: Vec<f64> = trips
        .records()
        .iter()
        .map(|t| t.trip_duration_seconds)
        .collect();
    let total_seconds: f64 = seconds.iter().sum();

    let report = DurationReport {
        total_hours: total_seconds / SECONDS_PER_HOUR,
        mean_minutes: mean(&seconds) / SECONDS_PER_MINUTE,
    };
    debug!(
        total_hours = report.total_hours,
        mean_minutes = report.mean_minutes,
        "Duration report computed"
    );

    Ok(report)
}
