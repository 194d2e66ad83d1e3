//! Dataset loading: CSV rows to filtered [`TripRecord`]s.
//!
//! Each dataset is one CSV file with a header row. `Start Time` and
//! `Trip Duration` are required; the station and rider columns are only
//! carried by some cities, so the loader records which columns the source
//! actually has in a [`Schema`] next to the rows.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::str::FromStr;

use chrono::{Datelike, Month, NaiveDateTime, Timelike, Weekday};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::DatasetCatalog;
use crate::error::{BikeshareError, Result};
use crate::filter::{FilterRequest, serialize_month, serialize_weekday};

/// Timestamp layouts accepted for `Start Time` / `End Time`.
/// `%.f` also matches when there is no fractional part.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// The cities trip data is published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DatasetId {
    #[serde(rename = "chicago")]
    Chicago,
    #[serde(rename = "new york city")]
    NewYorkCity,
    #[serde(rename = "washington")]
    Washington,
}

impl DatasetId {
    pub const ALL: [DatasetId; 3] = [Self::Chicago, Self::NewYorkCity, Self::Washington];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Chicago => "chicago",
            Self::NewYorkCity => "new york city",
            Self::Washington => "washington",
        }
    }

    /// File name of the dataset inside the data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Chicago => "chicago.csv",
            Self::NewYorkCity => "new_york_city.csv",
            Self::Washington => "washington.csv",
        }
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatasetId {
    type Err = String;

    /// Accepts any casing, with words separated by spaces, `_` or `-`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s
            .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
            .filter(|word| !word.is_empty())
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ");

        Self::ALL
            .into_iter()
            .find(|dataset| dataset.name() == normalized)
            .ok_or_else(|| {
                format!("'{s}' is not one of: chicago, new york city, washington")
            })
    }
}

/// A column a dataset may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    StartTime,
    EndTime,
    TripDuration,
    StartStation,
    EndStation,
    UserType,
    Gender,
    BirthYear,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Self::StartTime,
        Self::EndTime,
        Self::TripDuration,
        Self::StartStation,
        Self::EndStation,
        Self::UserType,
        Self::Gender,
        Self::BirthYear,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::StartTime => "start_time",
            Self::EndTime => "end_time",
            Self::TripDuration => "trip_duration_seconds",
            Self::StartStation => "start_station",
            Self::EndStation => "end_station",
            Self::UserType => "user_type",
            Self::Gender => "gender",
            Self::BirthYear => "birth_year",
        }
    }

    /// Header spellings recognised for this column. Must stay in sync with
    /// the serde names on `RawTrip`.
    fn headers(&self) -> &'static [&'static str] {
        match self {
            Self::StartTime => &["Start Time", "start_time"],
            Self::EndTime => &["End Time", "end_time"],
            Self::TripDuration => &["Trip Duration", "trip_duration_seconds", "trip_duration"],
            Self::StartStation => &["Start Station", "start_station"],
            Self::EndStation => &["End Station", "end_station"],
            Self::UserType => &["User Type", "user_type"],
            Self::Gender => &["Gender", "gender"],
            Self::BirthYear => &["Birth Year", "birth_year"],
        }
    }
}

/// The set of columns a loaded dataset actually carries.
///
/// A column that is absent here is different from a column whose value is
/// blank on some rows: the former means the statistic cannot be computed for
/// this city at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: impl IntoIterator<Item = Column>) -> Self {
        let mut schema = Self::default();
        for column in columns {
            if !schema.columns.contains(&column) {
                schema.columns.push(column);
            }
        }
        schema
    }

    pub fn from_headers(headers: &StringRecord) -> Self {
        Self::new(Column::ALL.into_iter().filter(|column| {
            headers
                .iter()
                .any(|header| column.headers().contains(&header.trim()))
        }))
    }

    pub fn has(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

/// One trip, with the calendar fields derived from its start time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRecord {
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub trip_duration_seconds: f64,
    pub start_station: Option<String>,
    pub end_station: Option<String>,
    pub user_type: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<i32>,
    #[serde(serialize_with = "serialize_month")]
    pub month: Month,
    #[serde(serialize_with = "serialize_weekday")]
    pub day_of_week: Weekday,
    pub hour: u32,
}

impl TripRecord {
    /// Builds a record with only the required fields set.
    pub fn new(start_time: NaiveDateTime, trip_duration_seconds: f64) -> Self {
        Self {
            start_time,
            end_time: None,
            trip_duration_seconds,
            start_station: None,
            end_station: None,
            user_type: None,
            gender: None,
            birth_year: None,
            month: month_of(&start_time),
            day_of_week: start_time.weekday(),
            hour: start_time.hour(),
        }
    }

    pub fn with_stations(mut self, start: &str, end: &str) -> Self {
        self.start_station = Some(start.to_string());
        self.end_station = Some(end.to_string());
        self
    }

    pub fn with_rider(
        mut self,
        user_type: Option<&str>,
        gender: Option<&str>,
        birth_year: Option<i32>,
    ) -> Self {
        self.user_type = user_type.map(str::to_string);
        self.gender = gender.map(str::to_string);
        self.birth_year = birth_year;
        self
    }
}

fn month_of(timestamp: &NaiveDateTime) -> Month {
    // month() is always within 1..=12
    Month::try_from(timestamp.month() as u8).unwrap_or(Month::January)
}

/// The trips left after filtering, in source order, with the source schema.
#[derive(Debug, Clone, PartialEq)]
pub struct TripSet {
    dataset: DatasetId,
    schema: Schema,
    records: Vec<TripRecord>,
}

impl TripSet {
    pub fn new(dataset: DatasetId, schema: Schema, records: Vec<TripRecord>) -> Self {
        Self {
            dataset,
            schema,
            records,
        }
    }

    pub fn dataset(&self) -> DatasetId {
        self.dataset
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fails with `MissingField` unless the source carried `column`.
    pub fn require(&self, column: Column) -> Result<()> {
        if self.schema.has(column) {
            Ok(())
        } else {
            Err(BikeshareError::MissingField {
                dataset: self.dataset,
                field: column.name(),
            })
        }
    }

    /// Fails with `EmptyInput` on behalf of `report` when there are no trips.
    pub fn require_records(&self, report: &'static str) -> Result<()> {
        if self.records.is_empty() {
            Err(BikeshareError::EmptyInput {
                dataset: self.dataset,
                report,
            })
        } else {
            Ok(())
        }
    }
}

/// A row as it appears in the CSV, before any parsing.
#[derive(Debug, Deserialize)]
struct RawTrip {
    #[serde(rename = "Start Time", alias = "start_time")]
    start_time: Option<String>,
    #[serde(rename = "End Time", alias = "end_time")]
    end_time: Option<String>,
    #[serde(
        rename = "Trip Duration",
        alias = "trip_duration_seconds",
        alias = "trip_duration"
    )]
    trip_duration: Option<String>,
    #[serde(rename = "Start Station", alias = "start_station")]
    start_station: Option<String>,
    #[serde(rename = "End Station", alias = "end_station")]
    end_station: Option<String>,
    #[serde(rename = "User Type", alias = "user_type")]
    user_type: Option<String>,
    #[serde(rename = "Gender", alias = "gender")]
    gender: Option<String>,
    #[serde(rename = "Birth Year", alias = "birth_year")]
    birth_year: Option<String>,
}

/// Loads the dataset named by `request` and applies its month/day filter.
///
/// # Errors
///
/// * `SourceNotFound` if the file cannot be opened.
/// * `MalformedSource` if a required column is missing.
/// * `MalformedRow` on the first row that fails to parse; nothing is
///   returned for a partially valid file.
#[tracing::instrument(
    skip(catalog),
    fields(dataset = %request.dataset, month = %request.month, day = %request.day)
)]
pub fn load(catalog: &DatasetCatalog, request: &FilterRequest) -> Result<TripSet> {
    let path = catalog.resolve(request.dataset);
    debug!(path = %path.display(), "Opening dataset");

    let file = File::open(&path).map_err(|source| BikeshareError::SourceNotFound {
        dataset: request.dataset,
        path: path.clone(),
        source,
    })?;

    read_trips(request, file)
}

/// Parses and filters CSV trip data from any reader.
pub fn read_trips<R: Read>(request: &FilterRequest, reader: R) -> Result<TripSet> {
    let dataset = request.dataset;
    // Trimmed so header detection and row mapping see the same names.
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| BikeshareError::MalformedSource {
            dataset,
            reason: format!("unreadable header: {e}"),
        })?
        .clone();

    let schema = Schema::from_headers(&headers);
    for required in [Column::StartTime, Column::TripDuration] {
        if !schema.has(required) {
            return Err(BikeshareError::MalformedSource {
                dataset,
                reason: format!("required column '{}' is absent", required.name()),
            });
        }
    }
    debug!(columns = ?schema.columns(), "Detected schema");

    let mut records = Vec::new();
    let mut total = 0usize;

    for result in rdr.records() {
        let row = result.map_err(|e| csv_row_error(dataset, e))?;
        let line = row.position().map_or(0, |p| p.line());
        let raw: RawTrip =
            row.deserialize(Some(&headers))
                .map_err(|e| BikeshareError::MalformedRow {
                    dataset,
                    row: line,
                    field: "record",
                    reason: e.to_string(),
                })?;
        let trip =
            parse_trip(raw, line).map_err(|(field, reason)| BikeshareError::MalformedRow {
                dataset,
                row: line,
                field,
                reason,
            })?;

        total += 1;
        if request.accepts(trip.month, trip.day_of_week) {
            records.push(trip);
        }
    }

    info!(total, kept = records.len(), "Dataset loaded");
    Ok(TripSet::new(dataset, schema, records))
}

fn csv_row_error(dataset: DatasetId, e: csv::Error) -> BikeshareError {
    match e.position() {
        Some(position) => BikeshareError::MalformedRow {
            dataset,
            row: position.line(),
            field: "record",
            reason: e.to_string(),
        },
        None => BikeshareError::MalformedSource {
            dataset,
            reason: e.to_string(),
        },
    }
}

type FieldError = (&'static str, String);

/// Only the start time and duration can fail a row; an unreadable value in
/// an optional column is dropped with a warning.
fn parse_trip(raw: RawTrip, line: u64) -> std::result::Result<TripRecord, FieldError> {
    let start_time = raw
        .start_time
        .as_deref()
        .ok_or_else(|| (Column::StartTime.name(), "value is blank".to_string()))
        .and_then(|s| parse_timestamp(s).ok_or_else(|| invalid(Column::StartTime, s)))?;

    let end_time = raw.end_time.as_deref().and_then(|s| {
        let parsed = parse_timestamp(s);
        if parsed.is_none() {
            warn!(row = line, value = s, "Ignoring unparseable end time");
        }
        parsed
    });

    let trip_duration_seconds = raw
        .trip_duration
        .as_deref()
        .ok_or_else(|| (Column::TripDuration.name(), "value is blank".to_string()))
        .and_then(|s| {
            s.trim()
                .parse::<f64>()
                .map_err(|_| invalid(Column::TripDuration, s))
        })?;

    // Exports store the year as a float, e.g. "1989.0".
    let birth_year = raw.birth_year.as_deref().and_then(|s| {
        let parsed = s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|year| year.is_finite())
            .map(|year| year.round() as i32);
        if parsed.is_none() {
            warn!(row = line, value = s, "Ignoring unparseable birth year");
        }
        parsed
    });

    let mut trip = TripRecord::new(start_time, trip_duration_seconds);
    trip.end_time = end_time;
    trip.start_station = non_blank(raw.start_station);
    trip.end_station = non_blank(raw.end_station);
    trip.user_type = non_blank(raw.user_type);
    trip.gender = non_blank(raw.gender);
    trip.birth_year = birth_year;
    Ok(trip)
}

fn invalid(column: Column, value: &str) -> FieldError {
    (column.name(), format!("cannot parse '{value}'"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}
