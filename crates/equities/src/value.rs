//! Scalar cell values of descriptive tables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single descriptive cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// No value.
    #[default]
    Empty,
    /// Boolean cell.
    Bool(bool),
    /// Numeric cell.
    Number(f64),
    /// Text cell.
    Text(String),
}

impl Value {
    /// Build a text value; the empty string becomes [`Value::Empty`].
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() { Self::Empty } else { Self::Text(s) }
    }

    /// Whether the cell holds no value.
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Borrow the text of a [`Value::Text`] cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric reading of the cell. Text is parsed leniently.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Empty | Self::Bool(_) => None,
        }
    }

    /// Convert a JSON scalar. Nested arrays and objects are kept as their
    /// JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Empty,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Empty, Self::Number),
            serde_json::Value::String(s) => Self::text(s.as_str()),
            other => Self::Text(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_text_is_empty() {
        assert_eq!(Value::from(""), Value::Empty);
        assert_eq!(Value::from("SNA"), Value::Text("SNA".to_string()));
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Value::from_json(&json!(null)), Value::Empty);
        assert_eq!(Value::from_json(&json!(17.25)), Value::Number(17.25));
        assert_eq!(Value::from_json(&json!(true)), Value::Bool(true));
        assert_eq!(Value::from_json(&json!("DRE")), Value::from("DRE"));
        assert_eq!(Value::from_json(&json!([1])), Value::Text("[1]".to_string()));
    }

    #[test]
    fn test_display_and_numeric_reading() {
        assert_eq!(Value::Number(9508.0).to_string(), "9508");
        assert_eq!(Value::Empty.to_string(), "");
        assert_eq!(Value::from(" 35.95").as_f64(), Some(35.95));
        assert_eq!(Value::Bool(true).as_f64(), None);
    }

    #[test]
    fn test_serializes_untagged() {
        let row = vec![Value::from("DRE"), Value::Number(35.95), Value::Empty];
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"["DRE",35.95,null]"#);
    }
}
