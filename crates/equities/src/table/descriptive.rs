//! Row-oriented table of descriptive equity data.

use crate::error::{Result, UniverseError};
use crate::value::Value;
use super::Record;
use serde::{Deserialize, Serialize};

/// Text some data sources use for a missing value.
const NONE_SENTINEL: &str = "None";

/// Named columns over rows of [`Value`]s.
///
/// Every row has exactly one value per column. A table without rows is
/// considered empty even when it has headers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct DescriptiveTable {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// Unchecked wire form; deserialized tables go through
/// [`DescriptiveTable::from_rows`].
#[derive(Deserialize)]
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl TryFrom<RawTable> for DescriptiveTable {
    type Error = UniverseError;

    fn try_from(raw: RawTable) -> Result<Self> {
        Self::from_rows(raw.headers, raw.rows)
    }
}

impl DescriptiveTable {
    /// Create an empty table.
    pub const fn new() -> Self {
        Self {
            headers: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Create a table from a header row and data rows.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseError::RaggedRow`] if a row's width differs from the
    /// header's.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != headers.len())
        {
            return Err(UniverseError::RaggedRow {
                row,
                expected: headers.len(),
                found: values.len(),
            });
        }
        Ok(Self { headers, rows })
    }

    /// Column names in order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows in order.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the column named exactly `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Whether a column named exactly `name` exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Resolve `name` to an existing column, falling back to its lowercase
    /// spelling.
    pub fn resolve_column(&self, name: &str) -> Option<String> {
        if self.has_column(name) {
            return Some(name.to_string());
        }
        let lower = name.to_lowercase();
        self.has_column(&lower).then_some(lower)
    }

    /// Values of column `name`, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// First row whose `column` cell reads exactly `key`.
    pub fn find_row(&self, column: &str, key: &str) -> Option<&[Value]> {
        let idx = self.column_index(column)?;
        self.rows
            .iter()
            .find(|row| cell_matches(&row[idx], key))
            .map(Vec::as_slice)
    }

    /// Pair a row with the column names, turning the `"None"` sentinel into
    /// [`Value::Empty`].
    pub fn record(&self, row: &[Value]) -> Record {
        self.headers
            .iter()
            .zip(row)
            .map(|(header, value)| {
                let value = match value {
                    Value::Text(s) if s == NONE_SENTINEL => Value::Empty,
                    other => other.clone(),
                };
                (header.clone(), value)
            })
            .collect()
    }

    /// Append a column of empty values. Returns `false` and leaves the table
    /// untouched when the column already exists.
    pub fn append_column(&mut self, name: &str) -> bool {
        if self.has_column(name) {
            return false;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(Value::Empty);
        }
        true
    }

    /// Append a row.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseError::RaggedRow`] if the row width is wrong.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.headers.len() {
            return Err(UniverseError::RaggedRow {
                row: self.rows.len(),
                expected: self.headers.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }
}

fn cell_matches(cell: &Value, key: &str) -> bool {
    match cell {
        Value::Text(s) => s == key,
        Value::Empty => false,
        other => other.to_string() == key,
    }
}
