//! One equity's descriptive data, in column order.

use crate::value::Value;
use serde::Serialize;

/// `column -> value` pairs of a single row, ordered like the table's columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Value under `column`.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Values in column order.
    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.fields.iter().map(|(_, value)| value)
    }

    /// Pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_column_order() {
        let record: Record = [("Ticker", "SNA"), ("Company", "Snap-on"), ("Sector", "")]
            .into_iter()
            .map(|(c, v)| (c.to_string(), Value::text(v)))
            .collect();

        assert_eq!(record.columns().collect::<Vec<_>>(), ["Ticker", "Company", "Sector"]);
        assert_eq!(record.get("Company"), Some(&Value::from("Snap-on")));
        assert_eq!(record.get("Sector"), Some(&Value::Empty));
        assert_eq!(record.get("P/E"), None);
        assert_eq!(record.len(), 3);
    }
}
