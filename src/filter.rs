//! Calendar filter applied while loading a dataset.

use std::fmt;
use std::str::FromStr;

use chrono::{Month, Weekday};
use serde::Serialize;

use crate::dataset::DatasetId;

/// The trip data only covers the first half of the year.
pub const LAST_COVERED_MONTH: u32 = 6;

/// Restricts trips to a single calendar month, or to none at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthConstraint {
    #[default]
    Unconstrained,
    Only(Month),
}

impl MonthConstraint {
    pub fn matches(&self, month: Month) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::Only(wanted) => *wanted == month,
        }
    }
}

impl FromStr for MonthConstraint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::Unconstrained);
        }
        let month = Month::from_str(s).map_err(|_| format!("'{s}' is not a month"))?;
        if month.number_from_month() > LAST_COVERED_MONTH {
            return Err(format!(
                "'{}' is outside the covered range January through June",
                month.name()
            ));
        }
        Ok(Self::Only(month))
    }
}

impl fmt::Display for MonthConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconstrained => write!(f, "all"),
            Self::Only(month) => write!(f, "{}", month.name()),
        }
    }
}

/// Restricts trips to a single day of the week, or to none at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayConstraint {
    #[default]
    Unconstrained,
    Only(Weekday),
}

impl DayConstraint {
    pub fn matches(&self, day: Weekday) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::Only(wanted) => *wanted == day,
        }
    }
}

impl FromStr for DayConstraint {
    type Err = String;

    /// Day names match case-insensitively; `all` lifts the constraint.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::Unconstrained);
        }
        Weekday::from_str(s)
            .map(Self::Only)
            .map_err(|_| format!("'{s}' is not a day of the week"))
    }
}

impl fmt::Display for DayConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconstrained => write!(f, "all"),
            Self::Only(day) => write!(f, "{}", weekday_name(*day)),
        }
    }
}

/// A validated request: which dataset, narrowed to which month and day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterRequest {
    pub dataset: DatasetId,
    pub month: MonthConstraint,
    pub day: DayConstraint,
}

impl FilterRequest {
    /// A request for the whole dataset.
    pub fn unconstrained(dataset: DatasetId) -> Self {
        Self {
            dataset,
            month: MonthConstraint::Unconstrained,
            day: DayConstraint::Unconstrained,
        }
    }

    pub fn with_month(mut self, month: MonthConstraint) -> Self {
        self.month = month;
        self
    }

    pub fn with_day(mut self, day: DayConstraint) -> Self {
        self.day = day;
        self
    }

    pub fn accepts(&self, month: Month, day: Weekday) -> bool {
        self.month.matches(month) && self.day.matches(day)
    }
}

/// Full English name of a weekday (`Weekday`'s own `Display` is abbreviated).
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub(crate) fn serialize_month<S: serde::Serializer>(
    month: &Month,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    month.name().serialize(serializer)
}

pub(crate) fn serialize_weekday<S: serde::Serializer>(
    day: &Weekday,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    weekday_name(*day).serialize(serializer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_parse_is_case_insensitive() {
        assert_eq!(
            "MARCH".parse::<MonthConstraint>(),
            Ok(MonthConstraint::Only(Month::March))
        );
        assert_eq!(
            "june".parse::<MonthConstraint>(),
            Ok(MonthConstraint::Only(Month::June))
        );
        assert_eq!(
            "All".parse::<MonthConstraint>(),
            Ok(MonthConstraint::Unconstrained)
        );
    }

    #[test]
    fn test_month_parse_rejects_uncovered_months() {
        assert!("july".parse::<MonthConstraint>().is_err());
        assert!("december".parse::<MonthConstraint>().is_err());
        assert!("smarch".parse::<MonthConstraint>().is_err());
    }

    #[test]
    fn test_day_parse_is_case_insensitive() {
        assert_eq!(
            "tUeSdAy".parse::<DayConstraint>(),
            Ok(DayConstraint::Only(Weekday::Tue))
        );
        assert_eq!("ALL".parse::<DayConstraint>(), Ok(DayConstraint::Unconstrained));
        assert!("funday".parse::<DayConstraint>().is_err());
    }

    #[test]
    fn test_unconstrained_accepts_everything() {
        let request = FilterRequest::unconstrained(DatasetId::Chicago);
        assert!(request.accepts(Month::January, Weekday::Mon));
        assert!(request.accepts(Month::June, Weekday::Sun));
    }

    #[test]
    fn test_constraints_are_conjunctive() {
        let request = FilterRequest::unconstrained(DatasetId::Chicago)
            .with_month(MonthConstraint::Only(Month::February))
            .with_day(DayConstraint::Only(Weekday::Fri));

        assert!(request.accepts(Month::February, Weekday::Fri));
        assert!(!request.accepts(Month::February, Weekday::Thu));
        assert!(!request.accepts(Month::March, Weekday::Fri));
    }

    #[test]
    fn test_display() {
        assert_eq!(MonthConstraint::Only(Month::April).to_string(), "April");
        assert_eq!(DayConstraint::Only(Weekday::Wed).to_string(), "Wednesday");
        assert_eq!(DayConstraint::Unconstrained.to_string(), "all");
    }
}
