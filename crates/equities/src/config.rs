//! Universe configuration.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default name of the identifier column.
pub const DEFAULT_ID_COLUMN: &str = "Ticker";

/// Default number of years of prices requested for a new ticker.
pub const DEFAULT_LOOKBACK_YEARS: u32 = 5;

/// Default name of the date column in the price sheet.
pub const DEFAULT_PRICES_INDEX: &str = "date";

/// Settings that shape how a universe reads and fetches data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    /// Column whose values name each equity.
    pub id_column_name: String,
    /// Years of price history requested when none is held yet.
    pub prices_lookback_years: u32,
    /// Name of the date column in the persisted price sheet.
    pub prices_index: String,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            id_column_name: DEFAULT_ID_COLUMN.to_string(),
            prices_lookback_years: DEFAULT_LOOKBACK_YEARS,
            prices_index: DEFAULT_PRICES_INDEX.to_string(),
        }
    }
}

impl UniverseConfig {
    /// Parse a configuration from JSON. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = UniverseConfig::default();
        assert_eq!(config.id_column_name, "Ticker");
        assert_eq!(config.prices_lookback_years, 5);
        assert_eq!(config.prices_index, "date");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = UniverseConfig::from_json_str(r#"{"prices_lookback_years": 10}"#).unwrap();
        assert_eq!(config.prices_lookback_years, 10);
        assert_eq!(config.id_column_name, "Ticker");
    }
}
