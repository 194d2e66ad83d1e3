use tracing::debug;

use crate::dataset::{Column, TripSet};
use crate::error::{BikeshareError, Result};
use crate::reports::types::{Route, StationReport};
use crate::reports::utility::mode;

/// Finds the most used start station, end station and start/end pair.
///
/// Ties go to the lexicographically smallest name (or pair). Trips with a
/// blank station are left out of the counts that need it.
///
/// # Errors
///
/// * `MissingField` if the dataset has no start or end station column.
/// * `EmptyInput` if there are no trips with stations to count.
#[tracing::instrument(skip_all, fields(dataset = %trips.dataset(), trips = trips.len()))]
pub fn summarize_stations(trips: &TripSet) -> Result<StationReport> {
    trips.require(Column::StartStation)?;
    trips.require(Column::EndStation)?;
    trips.require_records("station")?;

    let records = trips.records();
    let empty = || BikeshareError::EmptyInput {
        dataset: trips.dataset(),
        report: "station",
    };

    let busiest_start_station = mode(records.iter().filter_map(|t| t.start_station.as_deref()))
        .ok_or_else(empty)?
        .to_string();
    let busiest_end_station = mode(records.iter().filter_map(|t| t.end_station.as_deref()))
        .ok_or_else(empty)?
        .to_string();
    let (start, end) = mode(records.iter().filter_map(|t| {
        Some((t.start_station.as_deref()?, t.end_station.as_deref()?))
    }))
    .ok_or_else(empty)?;

    let busiest_route = Route {
        start_station: start.to_string(),
        end_station: end.to_string(),
    };
    debug!(
        start = %busiest_start_station,
        end = %busiest_end_station,
        route = %busiest_route,
        "Station report computed"
    );

    Ok(StationReport {
        busiest_start_station,
        busiest_end_station,
        busiest_route,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetId, Schema, TripRecord};
    use chrono::NaiveDateTime;

    fn trip(start: &str, end: &str) -> TripRecord {
        let at =
            NaiveDateTime::parse_from_str("2017-04-03 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        TripRecord::new(at, 300.0).with_stations(start, end)
    }

    fn stations() -> Schema {
        Schema::new([
            Column::StartTime,
            Column::TripDuration,
            Column::StartStation,
            Column::EndStation,
        ])
    }

    #[test]
    fn test_busiest_stations_and_route() {
        let trips = TripSet::new(
            DatasetId::NewYorkCity,
            stations(),
            vec![
                trip("Pershing Square", "Broadway"),
                trip("Pershing Square", "Grand Army Plaza"),
                trip("Broadway", "Grand Army Plaza"),
                trip("Broadway", "Grand Army Plaza"),
                trip("Pershing Square", "Broadway"),
            ],
        );

        let report = summarize_stations(&trips).unwrap();
        assert_eq!(report.busiest_start_station, "Pershing Square");
        assert_eq!(report.busiest_end_station, "Grand Army Plaza");
        // both routes appear twice; "Broadway" sorts first
        assert_eq!(
            report.busiest_route,
            Route {
                start_station: "Broadway".to_string(),
                end_station: "Grand Army Plaza".to_string(),
            }
        );
    }

    #[test]
    fn test_route_is_the_pair_not_the_stations() {
        // A is the busiest start, but the only repeated pair is D -> W
        let trips = TripSet::new(
            DatasetId::Chicago,
            stations(),
            vec![
                trip("A", "X"),
                trip("A", "Y"),
                trip("B", "Z"),
                trip("C", "Z"),
                trip("D", "W"),
                trip("D", "W"),
            ],
        );

        let report = summarize_stations(&trips).unwrap();
        assert_eq!(report.busiest_start_station, "A");
        assert_eq!(report.busiest_route.to_string(), "D / W");
    }

    #[test]
    fn test_missing_station_column() {
        let trips = TripSet::new(
            DatasetId::Washington,
            Schema::new([Column::StartTime, Column::TripDuration]),
            Vec::new(),
        );

        let err = summarize_stations(&trips).unwrap_err();
        assert!(matches!(
            err,
            BikeshareError::MissingField {
                field: "start_station",
                ..
            }
        ));
    }

    #[test]
    fn test_empty_input() {
        let trips = TripSet::new(DatasetId::Chicago, stations(), Vec::new());

        let err = summarize_stations(&trips).unwrap_err();
        assert!(matches!(err, BikeshareError::EmptyInput { report: "station", .. }));
    }
}
