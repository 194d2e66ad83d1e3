use tracing::{debug, warn};

use crate::dataset::{Column, TripSet};
use crate::error::Result;
use crate::reports::types::{BirthYearStats, BirthYears, DemographicsReport};
use crate::reports::utility::{mode, value_counts};

const DEMOGRAPHIC_COLUMNS: [Column; 3] = [Column::UserType, Column::Gender, Column::BirthYear];

/// Breaks riders down by user type and gender and summarizes birth years.
///
/// Each statistic is only produced when the dataset has the matching column;
/// Washington, for one, carries none of them. Frequency tables are ordered by
/// descending count with ties broken by category name, and blank values are
/// not counted. The birth-year mode goes to the earliest year on a tie.
///
/// # Errors
///
/// `EmptyInput` if there are no trips while at least one of the columns is
/// present. A dataset with none of them always yields an empty report.
#[tracing::instrument(skip_all, fields(dataset = %trips.dataset(), trips = trips.len()))]
pub fn summarize_demographics(trips: &TripSet) -> Result<DemographicsReport> {
    let schema = trips.schema();
    if !DEMOGRAPHIC_COLUMNS.iter().any(|c| schema.has(*c)) {
        debug!("Dataset has no demographic columns");
        return Ok(DemographicsReport::default());
    }
    trips.require_records("demographics")?;

    let records = trips.records();

    let user_type_counts = schema
        .has(Column::UserType)
        .then(|| value_counts(records.iter().filter_map(|t| t.user_type.as_deref())));
    let gender_counts = schema
        .has(Column::Gender)
        .then(|| value_counts(records.iter().filter_map(|t| t.gender.as_deref())));

    let birth_year = schema.has(Column::BirthYear).then(|| {
        let years: Vec<i32> = records.iter().filter_map(|t| t.birth_year).collect();
        match birth_year_stats(&years) {
            Some(stats) => BirthYears::Stats(stats),
            None => {
                warn!("Birth year column has no values in the filtered trips");
                BirthYears::NoValues
            }
        }
    });

    Ok(DemographicsReport {
        user_type_counts,
        gender_counts,
        birth_year,
    })
}

fn birth_year_stats(years: &[i32]) -> Option<BirthYearStats> {
    Some(BirthYearStats {
        min: *years.iter().min()?,
        max: *years.iter().max()?,
        mode: mode(years.iter().copied())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetId, Schema, TripRecord};
    use crate::error::BikeshareError;
    use crate::reports::types::CategoryCount;
    use chrono::NaiveDateTime;

    fn rider(user_type: Option<&str>, gender: Option<&str>, birth_year: Option<i32>) -> TripRecord {
        let at =
            NaiveDateTime::parse_from_str("2017-02-14 18:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        TripRecord::new(at, 420.0).with_rider(user_type, gender, birth_year)
    }

    fn schema(columns: &[Column]) -> Schema {
        Schema::new(
            [Column::StartTime, Column::TripDuration]
                .into_iter()
                .chain(columns.iter().copied()),
        )
    }

    fn count(category: &str, count: usize) -> CategoryCount {
        CategoryCount {
            category: category.to_string(),
            count,
        }
    }

    #[test]
    fn test_full_demographics() {
        let trips = TripSet::new(
            DatasetId::Chicago,
            schema(&DEMOGRAPHIC_COLUMNS),
            vec![
                rider(Some("Subscriber"), Some("Male"), Some(1989)),
                rider(Some("Subscriber"), Some("Female"), Some(1975)),
                rider(Some("Customer"), None, None),
                rider(Some("Subscriber"), Some("Male"), Some(1992)),
                rider(Some("Customer"), Some("Female"), Some(1975)),
            ],
        );

        let report = summarize_demographics(&trips).unwrap();
        assert_eq!(
            report.user_type_counts,
            Some(vec![count("Subscriber", 3), count("Customer", 2)])
        );
        assert_eq!(
            report.gender_counts,
            Some(vec![count("Female", 2), count("Male", 2)])
        );
        assert_eq!(
            report.birth_year,
            Some(BirthYears::Stats(BirthYearStats {
                min: 1975,
                max: 1992,
                mode: 1975,
            }))
        );
    }

    #[test]
    fn test_birth_year_mode_ties_pick_earliest() {
        let trips = TripSet::new(
            DatasetId::NewYorkCity,
            schema(&[Column::BirthYear]),
            vec![
                rider(None, None, Some(1990)),
                rider(None, None, Some(1980)),
                rider(None, None, Some(1990)),
                rider(None, None, Some(1980)),
            ],
        );

        let report = summarize_demographics(&trips).unwrap();
        let stats = report.birth_year.as_ref().and_then(BirthYears::stats).unwrap();
        assert_eq!(stats.mode, 1980);
    }

    #[test]
    fn test_missing_birth_year_column_is_absent() {
        let trips = TripSet::new(
            DatasetId::Chicago,
            schema(&[Column::UserType, Column::Gender]),
            vec![rider(Some("Customer"), Some("Male"), None)],
        );

        let report = summarize_demographics(&trips).unwrap();
        assert_eq!(report.birth_year, None);
        assert_eq!(report.user_type_counts, Some(vec![count("Customer", 1)]));
        assert_eq!(report.gender_counts, Some(vec![count("Male", 1)]));
    }

    #[test]
    fn test_present_column_with_only_blanks_is_empty_table() {
        let trips = TripSet::new(
            DatasetId::Chicago,
            schema(&[Column::Gender]),
            vec![rider(None, None, None)],
        );

        let report = summarize_demographics(&trips).unwrap();
        assert_eq!(report.gender_counts, Some(Vec::new()));
        assert_eq!(report.user_type_counts, None);
    }

    #[test]
    fn test_blank_birth_years_differ_from_missing_column() {
        let blank = TripSet::new(
            DatasetId::Chicago,
            schema(&[Column::BirthYear]),
            vec![rider(None, None, None)],
        );
        let missing = TripSet::new(
            DatasetId::Chicago,
            schema(&[Column::UserType]),
            vec![rider(Some("Customer"), None, None)],
        );

        let blank = summarize_demographics(&blank).unwrap();
        let missing = summarize_demographics(&missing).unwrap();
        assert_eq!(blank.birth_year, Some(BirthYears::NoValues));
        assert_eq!(missing.birth_year, None);
        assert_ne!(blank.birth_year, missing.birth_year);
    }

    #[test]
    fn test_no_demographic_columns() {
        let trips = TripSet::new(DatasetId::Washington, schema(&[]), Vec::new());

        let report = summarize_demographics(&trips).unwrap();
        assert_eq!(report, DemographicsReport::default());
    }

    #[test]
    fn test_empty_input_with_columns() {
        let trips = TripSet::new(DatasetId::Chicago, schema(&[Column::UserType]), Vec::new());

        let err = summarize_demographics(&trips).unwrap_err();
        assert!(matches!(
            err,
            BikeshareError::EmptyInput {
                report: "demographics",
                ..
            }
        ));
    }
}
