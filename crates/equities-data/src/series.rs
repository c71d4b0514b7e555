//! Date-indexed price series for a single ticker.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// `num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Convert a date to days since the Unix epoch, the physical
/// representation of a polars `Date`.
pub fn epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Inverse of [`epoch_days`].
pub fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

/// Closing prices for one ticker, ordered by date.
///
/// Each date holds at most one observation; inserting an existing date
/// replaces the stored price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    name: String,
    points: BTreeMap<NaiveDate, f64>,
}

impl PriceSeries {
    /// Create an empty series.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: BTreeMap::new(),
        }
    }

    /// Create a series from `(date, price)` pairs.
    pub fn from_points<I>(name: impl Into<String>, points: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self {
            name: name.into(),
            points: points.into_iter().collect(),
        }
    }

    /// Series name, usually the ticker symbol.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the series.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Insert or replace the price observed on `date`.
    pub fn insert(&mut self, date: NaiveDate, price: f64) -> Option<f64> {
        self.points.insert(date, price)
    }

    /// Price observed on `date`.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points.get(&date).copied()
    }

    /// Earliest observation date.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.keys().next().copied()
    }

    /// Latest observation date.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.keys().next_back().copied()
    }

    /// Observation dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.keys().copied()
    }

    /// `(date, price)` pairs in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points.iter().map(|(date, price)| (*date, *price))
    }

    /// Merge `other` into this series. Observations from `other` win on
    /// overlapping dates.
    pub fn extend_from(&mut self, other: &Self) {
        self.points.extend(other.iter());
    }
}

impl IntoIterator for PriceSeries {
    type Item = (NaiveDate, f64);
    type IntoIter = btree_map::IntoIter<NaiveDate, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}
