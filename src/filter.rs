//! Period and truck/route selection over the trip log.

use crate::error::{Error, Result};
use crate::types::TripRecord;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A calendar month, the dashboard's reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidPeriod(format!("{:04}-{:02}", year, month)));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The month before this one.
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Long label such as `June 2025`.
    pub fn display_name(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| self.to_string())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidPeriod(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        Period::new(year, month).map_err(|_| invalid())
    }
}

/// Truck or route predicate. `All` matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selector {
    #[default]
    All,
    Only(String),
}

impl Selector {
    /// `"All"` (any case) and the empty string select everything.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Selector::All
        } else {
            Selector::Only(s.to_string())
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(v) => v == value,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::All => write!(f, "All"),
            Selector::Only(v) => write!(f, "{}", v),
        }
    }
}

/// Rows of `trips` in `period` that match both selectors, in input order.
///
/// A period with no rows yields an empty table.
pub fn filter_trips(
    trips: &[TripRecord],
    period: Period,
    truck: &Selector,
    route: &Selector,
) -> Vec<TripRecord> {
    let out: Vec<TripRecord> = trips
        .iter()
        .filter(|t| period.contains(t.date))
        .filter(|t| truck.matches(&t.truck_id))
        .filter(|t| route.matches(&t.route_code))
        .cloned()
        .collect();
    tracing::debug!(%period, %truck, %route, rows = out.len(), "filtered trips");
    out
}

/// Distinct periods present in the trip log, ascending.
pub fn period_index(trips: &[TripRecord]) -> Vec<Period> {
    trips
        .iter()
        .map(|t| Period::of(t.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
