//! Partial-precision birth dates.
//!
//! Survey answers range from a bare year to a full date in whatever format
//! the form tool exported. A [`BirthDate`] keeps exactly the precision that
//! was given and renders back to ISO form (`1950`, `1950-03`, `1950-03-28`).

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Full-date layouts seen in survey exports, tried in order.
const FULL_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y", "%d-%m-%Y"];

/// A birth date known to year, year+month or full-day precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BirthDate {
    pub year: i32,
    pub month: Option<u8>,
    pub day: Option<u8>,
}

impl BirthDate {
    pub fn year(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
        }
    }

    /// A full date, `None` if it does not exist in the calendar.
    pub fn ymd(year: i32, month: u8, day: u8) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month.into(), day.into()).map(Self::from)
    }

    fn year_month(year: i32, month: u8) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month.into(), 1)?;
        Some(Self {
            year,
            month: Some(month),
            day: None,
        })
    }

    /// Parses a free-text birth field.
    ///
    /// Accepted shapes: `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `M/D/YYYY` (the
    /// survey export format, optionally followed by a time) and `D.M.YYYY` /
    /// `D-M-YYYY`. The year must be written with four digits. Returns `None`
    /// for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        // Drop a trailing time component such as "8/24/1919 0:00:00".
        let text = raw.split_whitespace().next()?;

        let parts: Vec<&str> = text.split(['-', '/', '.']).collect();
        let numeric = parts
            .iter()
            .all(|p| !p.is_empty() && p.len() <= 4 && p.chars().all(|c| c.is_ascii_digit()));
        if !numeric || !parts.iter().any(|p| is_year(p)) {
            return None;
        }

        if let Some(date) = FULL_DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        {
            return Some(date.into());
        }

        match parts.as_slice() {
            [y] if is_year(y) => Some(Self::year(y.parse().ok()?)),
            [y, m] if is_year(y) && !text.contains(['/', '.']) => {
                Self::year_month(y.parse().ok()?, m.parse().ok()?)
            }
            _ => None,
        }
    }
}

impl From<NaiveDate> for BirthDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: u8::try_from(date.month()).ok(),
            day: u8::try_from(date.day()).ok(),
        }
    }
}

fn is_year(part: &str) -> bool {
    part.len() == 4
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        if let Some(month) = self.month {
            write!(f, "-{:02}", month)?;
            if let Some(day) = self.day {
                write!(f, "-{:02}", day)?;
            }
        }
        Ok(())
    }
}

/// Error returned when a string is not a recognizable birth date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized birth date \"{0}\"")]
pub struct InvalidBirthDate(pub String);

impl FromStr for BirthDate {
    type Err = InvalidBirthDate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidBirthDate(s.to_string()))
    }
}

impl Serialize for BirthDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
