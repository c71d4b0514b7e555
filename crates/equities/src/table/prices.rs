//! Date-indexed, column-per-ticker price table.

use crate::error::{Result, UniverseError};
use chrono::NaiveDate;
use equities_data::PriceSeries;
use equities_data::series::{date_from_epoch_days, epoch_days};
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Prices for many tickers aligned on a shared date index.
///
/// The index is strictly ascending. Each column holds one cell per index
/// date; `None` marks a missing observation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    index: Vec<NaiveDate>,
    columns: Vec<String>,
    data: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    /// Create an empty table.
    pub const fn new() -> Self {
        Self {
            index: Vec::new(),
            columns: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Assemble a table from per-ticker series, aligned on the union of
    /// their dates.
    ///
    /// Columns follow the input order. A repeated name keeps its first
    /// position and takes the last series given for it.
    pub fn from_series<I, S>(series: I) -> Self
    where
        I: IntoIterator<Item = (S, PriceSeries)>,
        S: Into<String>,
    {
        let mut columns: Vec<String> = Vec::new();
        let mut by_column: Vec<PriceSeries> = Vec::new();
        for (name, s) in series {
            let name = name.into();
            match columns.iter().position(|c| *c == name) {
                Some(pos) => by_column[pos] = s,
                None => {
                    columns.push(name);
                    by_column.push(s);
                }
            }
        }

        let index: Vec<NaiveDate> = by_column
            .iter()
            .flat_map(PriceSeries::dates)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let data = by_column
            .iter()
            .map(|s| index.iter().map(|date| s.get(*date)).collect())
            .collect();

        Self {
            index,
            columns,
            data,
        }
    }

    /// Build a table from row-oriented data.
    ///
    /// Rows may arrive in any order; they are sorted by date and a repeated
    /// date keeps its last row.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseError::RaggedRow`] if a row's width differs from the
    /// number of columns.
    pub fn from_rows(columns: Vec<String>, rows: Vec<(NaiveDate, Vec<Option<f64>>)>) -> Result<Self> {
        let mut sorted = BTreeMap::new();
        for (row, (date, values)) in rows.into_iter().enumerate() {
            if values.len() != columns.len() {
                return Err(UniverseError::RaggedRow {
                    row,
                    expected: columns.len(),
                    found: values.len(),
                });
            }
            sorted.insert(date, values);
        }

        let mut data = vec![Vec::with_capacity(sorted.len()); columns.len()];
        let mut index = Vec::with_capacity(sorted.len());
        for (date, values) in sorted {
            index.push(date);
            for (column, value) in data.iter_mut().zip(values) {
                column.push(value);
            }
        }

        Ok(Self {
            index,
            columns,
            data,
        })
    }

    /// Whether the table has no columns or no dates.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.index.is_empty()
    }

    /// Number of dates.
    pub fn height(&self) -> usize {
        self.index.len()
    }

    /// Number of ticker columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// The date index.
    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    /// Ticker column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether `ticker` has a column.
    pub fn contains(&self, ticker: &str) -> bool {
        self.columns.iter().any(|c| c == ticker)
    }

    /// Observed prices of `ticker`; missing cells are left out.
    pub fn column(&self, ticker: &str) -> Option<PriceSeries> {
        let pos = self.columns.iter().position(|c| c == ticker)?;
        let points = self
            .index
            .iter()
            .zip(&self.data[pos])
            .filter_map(|(date, price)| price.map(|p| (*date, p)));
        Some(PriceSeries::from_points(ticker, points))
    }

    /// Observed prices of `ticker`, or an empty series when it has none.
    pub fn series_or_empty(&self, ticker: &str) -> PriceSeries {
        self.column(ticker)
            .unwrap_or_else(|| PriceSeries::new(ticker))
    }

    /// Price of `ticker` on `date`.
    pub fn get(&self, ticker: &str, date: NaiveDate) -> Option<f64> {
        let pos = self.columns.iter().position(|c| c == ticker)?;
        let row = self.index.binary_search(&date).ok()?;
        self.data[pos][row]
    }

    /// Row-oriented view: each date with one cell per column.
    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, Vec<Option<f64>>)> + '_ {
        self.index
            .iter()
            .enumerate()
            .map(|(row, date)| (*date, self.data.iter().map(|column| column[row]).collect()))
    }

    /// Convert to a polars frame: an `index_name` column of dtype `Date`
    /// followed by one `Float64` column per ticker.
    pub fn to_dataframe(&self, index_name: &str) -> Result<DataFrame> {
        let days: Vec<i32> = self.index.iter().map(|d| epoch_days(*d)).collect();
        let mut columns: Vec<Column> = Vec::with_capacity(self.columns.len() + 1);
        columns.push(
            Series::new(index_name.into(), days)
                .cast(&DataType::Date)?
                .into(),
        );
        for (name, values) in self.columns.iter().zip(&self.data) {
            columns.push(Series::new(name.as_str().into(), values.as_slice()).into());
        }
        Ok(DataFrame::new(columns)?)
    }

    /// Build a table from a polars frame whose `index_name` column holds
    /// dates. Every other column is read as prices; rows with a null date
    /// are dropped.
    pub fn from_dataframe(df: &DataFrame, index_name: &str) -> Result<Self> {
        let days = df
            .column(index_name)?
            .cast(&DataType::Date)?
            .cast(&DataType::Int32)?;

        let mut columns = Vec::new();
        let mut values = Vec::new();
        for column in df.get_columns() {
            if column.name().as_str() == index_name {
                continue;
            }
            let prices = column.cast(&DataType::Float64)?;
            columns.push(column.name().to_string());
            values.push(prices.f64()?.into_iter().collect::<Vec<_>>());
        }

        let mut rows = Vec::with_capacity(df.height());
        for (row, day) in days.i32()?.into_iter().enumerate() {
            let Some(date) = day.and_then(date_from_epoch_days) else {
                continue;
            };
            rows.push((date, values.iter().map(|column| column[row]).collect()));
        }

        Self::from_rows(columns, rows)
    }
}
