//! Descriptive statistics over a filtered [`TripSet`].
//!
//! The four generators are independent: each reads the same trips and
//! returns its own report or its own error.

pub mod demographics;
pub mod duration;
pub mod station;
pub mod time;
pub mod types;
pub mod utility;

pub use demographics::summarize_demographics;
pub use duration::summarize_duration;
pub use station::summarize_stations;
pub use time::summarize_time;

use crate::dataset::TripSet;
use crate::error::Result;
use crate::reports::types::{DemographicsReport, DurationReport, StationReport, TimeReport};

/// The outcome of every generator for one set of trips.
#[derive(Debug)]
pub struct Summary {
    pub time: Result<TimeReport>,
    pub stations: Result<StationReport>,
    pub duration: Result<DurationReport>,
    pub demographics: Result<DemographicsReport>,
}

/// Runs all four generators; a failing one does not stop the others.
pub fn summarize_all(trips: &TripSet) -> Summary {
    Summary {
        time: summarize_time(trips),
        stations: summarize_stations(trips),
        duration: summarize_duration(trips),
        demographics: summarize_demographics(trips),
    }
}
