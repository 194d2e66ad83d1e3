//! Report structures produced by the generators.

use std::fmt;

use chrono::{Month, Weekday};
use serde::Serialize;

use crate::filter::{serialize_month, serialize_weekday};

/// Busiest travel times.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeReport {
    #[serde(serialize_with = "serialize_month")]
    pub busiest_month: Month,
    #[serde(serialize_with = "serialize_weekday")]
    pub busiest_day_of_week: Weekday,
    pub busiest_hour: u32,
}

/// A start/end station pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub start_station: String,
    pub end_station: String,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.start_station, self.end_station)
    }
}

/// Busiest stations and trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationReport {
    pub busiest_start_station: String,
    pub busiest_end_station: String,
    pub busiest_route: Route,
}

/// Total and average trip duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationReport {
    pub total_hours: f64,
    pub mean_minutes: f64,
}

/// One row of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Earliest, most recent and most common rider birth year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BirthYearStats {
    pub min: i32,
    pub max: i32,
    pub mode: i32,
}

/// Birth-year outcome for a dataset that has the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BirthYears {
    Stats(BirthYearStats),
    /// Every selected trip left the birth year blank.
    NoValues,
}

impl BirthYears {
    pub fn stats(&self) -> Option<&BirthYearStats> {
        match self {
            BirthYears::Stats(stats) => Some(stats),
            BirthYears::NoValues => None,
        }
    }
}

/// Rider statistics. A field is `None` when the dataset has no such column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DemographicsReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type_counts: Option<Vec<CategoryCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender_counts: Option<Vec<CategoryCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<BirthYears>,
}
