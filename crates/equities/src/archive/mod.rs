//! Multi-sheet archives that persist a universe.
//!
//! Sheet 0 holds the descriptive table. An optional sheet 1 holds prices
//! with a date column followed by one column per ticker.

pub mod json;
pub mod xlsx;

use crate::error::{Result, UniverseError};
use crate::table::{DescriptiveTable, PriceTable};
use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;
use tracing::warn;

/// Title of the descriptive sheet written on save.
pub const EQUITIES_SHEET: &str = "equities";

/// Title of the price sheet written on save.
pub const PRICES_SHEET: &str = "prices";

/// Storage formats a universe can be loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFormat {
    /// Office Open XML workbook.
    Xlsx,
    /// JSON databook.
    Json,
}

impl StorageFormat {
    /// Extensions accepted for storage, in lowercase.
    pub const SUPPORTED: [&'static str; 2] = ["xlsx", "json"];

    /// Pick the format from the extension of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "json" => Ok(Self::Json),
            _ => Err(UniverseError::UnsupportedFormat(format!(
                "'{}' is not one of: {}",
                path.display(),
                Self::SUPPORTED.join(", ")
            ))),
        }
    }

    /// File extension for this format.
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Json => "json",
        }
    }
}

/// A titled table inside an archive.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    /// Sheet title.
    pub title: String,
    /// Sheet contents, first row as header.
    pub table: DescriptiveTable,
}

impl Sheet {
    /// Create a sheet.
    pub fn new(title: impl Into<String>, table: DescriptiveTable) -> Self {
        Self {
            title: title.into(),
            table,
        }
    }
}

/// Read every sheet of the archive at `path`.
pub fn read_archive(path: &Path) -> Result<Vec<Sheet>> {
    let format = StorageFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    match format {
        StorageFormat::Xlsx => xlsx::read_sheets(bytes),
        StorageFormat::Json => json::read_sheets(&bytes),
    }
}

/// Write `sheets` to `path`. Only XLSX archives are writable.
pub fn write_archive(path: &Path, sheets: &[Sheet]) -> Result<()> {
    match StorageFormat::from_path(path)? {
        StorageFormat::Xlsx => xlsx::write_sheets(path, sheets),
        StorageFormat::Json => Err(UniverseError::UnsupportedFormat(format!(
            "'{}': archives are only written as xlsx",
            path.display()
        ))),
    }
}

/// Lay a price table out as a sheet: an `index_name` column of ISO dates
/// followed by one column per ticker, missing prices left blank.
pub fn prices_to_sheet(prices: &PriceTable, index_name: &str) -> Result<Sheet> {
    let headers: Vec<String> = std::iter::once(index_name.to_string())
        .chain(prices.columns().iter().cloned())
        .collect();
    let rows: Vec<Vec<Value>> = prices
        .rows()
        .map(|(date, cells)| {
            std::iter::once(Value::Text(date.format("%Y-%m-%d").to_string()))
                .chain(cells.into_iter().map(|c| c.map_or(Value::Empty, Value::Number)))
                .collect()
        })
        .collect();
    Ok(Sheet::new(PRICES_SHEET, DescriptiveTable::from_rows(headers, rows)?))
}

/// Read a price sheet.
///
/// The index is the column named `index_name` (ignoring case). Without one,
/// the first column is the index when its header is blank or it holds
/// dates. Rows whose index does not read as a date are skipped; cells that
/// do not read as numbers are missing.
///
/// # Errors
///
/// Returns [`UniverseError::Parse`] when a sheet with rows has no index
/// column.
pub fn prices_from_sheet(table: &DescriptiveTable, index_name: &str) -> Result<PriceTable> {
    if table.is_empty() {
        return Ok(PriceTable::new());
    }
    let index_pos = table
        .headers()
        .iter()
        .position(|h| h.eq_ignore_ascii_case(index_name))
        .or_else(|| first_column_is_index(table).then_some(0))
        .ok_or_else(|| {
            UniverseError::Parse(format!(
                "price sheet has no '{index_name}' column and its first column holds no dates"
            ))
        })?;

    let columns: Vec<String> = table
        .headers()
        .iter()
        .enumerate()
        .filter(|(pos, _)| *pos != index_pos)
        .map(|(_, h)| h.clone())
        .collect();

    let mut rows = Vec::with_capacity(table.height());
    let mut skipped = 0usize;
    for row in table.rows() {
        let Some(date) = parse_date(&row[index_pos]) else {
            skipped += 1;
            continue;
        };
        let cells: Vec<Option<f64>> = row
            .iter()
            .enumerate()
            .filter(|(pos, _)| *pos != index_pos)
            .map(|(_, v)| v.as_f64())
            .collect();
        rows.push((date, cells));
    }

    if skipped > 0 {
        warn!(
            skipped,
            index = %table.headers()[index_pos],
            "price rows without a readable date were skipped"
        );
    }
    PriceTable::from_rows(columns, rows)
}

/// An unnamed first column, as pandas writes its index, or one with dates.
fn first_column_is_index(table: &DescriptiveTable) -> bool {
    table.headers().first().is_some_and(|h| h.trim().is_empty())
        || table
            .rows()
            .iter()
            .any(|row| row.first().and_then(parse_date).is_some())
}

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Read an index cell as a date.
fn parse_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().or_else(|| {
        DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(|dt| dt.date())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use equities_data::PriceSeries;
    use rstest::rstest;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 2, day).unwrap()
    }

    #[rstest]
    #[case("universe.xlsx", StorageFormat::Xlsx)]
    #[case("universe.XLSX", StorageFormat::Xlsx)]
    #[case("dir/universe.json", StorageFormat::Json)]
    fn test_supported_formats(#[case] path: &str, #[case] expected: StorageFormat) {
        assert_eq!(StorageFormat::from_path(Path::new(path)).unwrap(), expected);
    }

    #[rstest]
    #[case("universe.csv")]
    #[case("universe.xls")]
    #[case("universe")]
    fn test_unsupported_formats(#[case] path: &str) {
        assert!(matches!(
            StorageFormat::from_path(Path::new(path)),
            Err(UniverseError::UnsupportedFormat(_))
        ));
    }

    #[rstest]
    #[case("2018-02-05", Some(date(5)))]
    #[case("2018-02-05 00:00:00", Some(date(5)))]
    #[case("2018-02-05T13:30:00", Some(date(5)))]
    #[case("05/02/2018", None)]
    #[case("", None)]
    fn test_parse_date(#[case] text: &str, #[case] expected: Option<NaiveDate>) {
        assert_eq!(parse_date(&Value::from(text)), expected);
    }

    #[test]
    fn test_price_sheet_round_trip() {
        let prices = PriceTable::from_series(vec![
            ("SNA", PriceSeries::from_points("SNA", vec![(date(5), 1.0), (date(6), 2.0)])),
            ("DRE", PriceSeries::from_points("DRE", vec![(date(6), 3.0)])),
        ]);

        let sheet = prices_to_sheet(&prices, "date").unwrap();
        assert_eq!(sheet.title, PRICES_SHEET);
        assert_eq!(sheet.table.headers(), &["date", "SNA", "DRE"]);
        assert_eq!(sheet.table.rows()[0][2], Value::Empty);

        assert_eq!(prices_from_sheet(&sheet.table, "date").unwrap(), prices);
    }

    #[test]
    fn test_price_sheet_without_date_column_uses_first_column() {
        let table = DescriptiveTable::from_rows(
            vec![String::new(), "SNA".to_string()],
            vec![
                vec!["2018-02-05".into(), Value::Number(1.0)],
                vec!["not a date".into(), Value::Number(2.0)],
                vec!["2018-02-07".into(), "n/a".into()],
            ],
        )
        .unwrap();

        let prices = prices_from_sheet(&table, "date").unwrap();
        assert_eq!(prices.index(), &[date(5), date(7)]);
        assert_eq!(prices.get("SNA", date(5)), Some(1.0));
        assert_eq!(prices.get("SNA", date(7)), None);
    }

    #[rstest]
    #[case("date")]
    #[case("Date")]
    #[case("DATE")]
    fn test_price_index_header_ignores_case(#[case] header: &str) {
        let table = DescriptiveTable::from_rows(
            vec!["SNA".to_string(), header.to_string()],
            vec![vec![Value::Number(1.0), "2018-02-05".into()]],
        )
        .unwrap();

        let prices = prices_from_sheet(&table, "date").unwrap();
        assert_eq!(prices.columns(), &["SNA"]);
        assert_eq!(prices.get("SNA", date(5)), Some(1.0));
    }

    #[test]
    fn test_named_first_column_holding_dates_is_the_index() {
        let table = DescriptiveTable::from_rows(
            vec!["timestamp".to_string(), "SNA".to_string()],
            vec![vec!["2018-02-05 00:00:00".into(), Value::Number(1.0)]],
        )
        .unwrap();

        let prices = prices_from_sheet(&table, "date").unwrap();
        assert_eq!(prices.columns(), &["SNA"]);
        assert_eq!(prices.height(), 1);
    }

    #[test]
    fn test_price_sheet_without_index_is_rejected() {
        let table = DescriptiveTable::from_rows(
            vec!["SNA".to_string(), "DRE".to_string()],
            vec![vec![Value::Number(1.0), Value::Number(2.0)]],
        )
        .unwrap();

        assert!(matches!(
            prices_from_sheet(&table, "date"),
            Err(UniverseError::Parse(_))
        ));
    }

    #[test]
    fn test_json_archives_are_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_archive(&dir.path().join("universe.json"), &[]);
        assert!(matches!(result, Err(UniverseError::UnsupportedFormat(_))));
    }
}
