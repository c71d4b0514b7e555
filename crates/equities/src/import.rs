//! Reading descriptive tables from CSV, TSV, spreadsheet and JSON files.
//!
//! The format is sniffed from the file contents, not its extension.

use crate::archive::{json, xlsx};
use crate::error::{Result, UniverseError};
use crate::table::DescriptiveTable;
use crate::value::Value;
use std::path::Path;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE2_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

/// Formats understood by [`read_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// Comma-separated values.
    Csv,
    /// Tab-separated values.
    Tsv,
    /// XLSX or XLS workbook; the first sheet is read.
    Workbook,
    /// JSON dataset.
    Json,
}

impl ImportFormat {
    /// Guess the format of `bytes`.
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE2_MAGIC) {
            return Self::Workbook;
        }
        let text = strip_bom(bytes);
        match text.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'[' | b'{') => Self::Json,
            _ => {
                let header = text.split(|b| *b == b'\n').next().unwrap_or_default();
                if header.contains(&b'\t') && !header.contains(&b',') {
                    Self::Tsv
                } else {
                    Self::Csv
                }
            }
        }
    }
}

/// Read the file at `path` into a table.
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<DescriptiveTable> {
    parse_table(std::fs::read(path)?)
}

/// Parse file contents into a table.
pub fn parse_table(bytes: Vec<u8>) -> Result<DescriptiveTable> {
    match ImportFormat::detect(&bytes) {
        ImportFormat::Csv => parse_delimited(strip_bom(&bytes), b','),
        ImportFormat::Tsv => parse_delimited(strip_bom(&bytes), b'\t'),
        ImportFormat::Json => {
            let json: serde_json::Value = serde_json::from_slice(strip_bom(&bytes))?;
            json::table_from_json(&json)
        }
        ImportFormat::Workbook => xlsx::read_sheets(bytes)?
            .into_iter()
            .next()
            .map(|sheet| sheet.table)
            .ok_or_else(|| UniverseError::Parse("workbook has no sheets".to_string())),
    }
}

/// Every field is read as text; empty fields become [`Value::Empty`].
fn parse_delimited(bytes: &[u8], delimiter: u8) -> Result<DescriptiveTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = DescriptiveTable::from_rows(headers, Vec::new())?;
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(Value::from).collect())?;
    }
    Ok(table)
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"Ticker,Company\nSNA,Snap-on\n", ImportFormat::Csv)]
    #[case(b"Ticker\tCompany\nSNA\tSnap-on\n", ImportFormat::Tsv)]
    #[case(b"Ticker\tCompany, Inc.\n", ImportFormat::Csv)]
    #[case(b"  [{\"Ticker\": \"SNA\"}]", ImportFormat::Json)]
    #[case(b"\xEF\xBB\xBF{\"data\": []}", ImportFormat::Json)]
    #[case(b"PK\x03\x04rest", ImportFormat::Workbook)]
    #[case(b"\xD0\xCF\x11\xE0rest", ImportFormat::Workbook)]
    fn test_detect(#[case] bytes: &[u8], #[case] expected: ImportFormat) {
        assert_eq!(ImportFormat::detect(bytes), expected);
    }

    #[test]
    fn test_csv_keeps_text_and_quotes() {
        let csv = "Ticker,Company,P/E\nJKHY,\"Jack Henry & Associates, Inc.\",38.81\nDRE,,35.95\n";
        let table = parse_table(csv.as_bytes().to_vec()).unwrap();

        assert_eq!(table.headers(), &["Ticker", "Company", "P/E"]);
        assert_eq!(
            table.rows()[0],
            vec![
                Value::from("JKHY"),
                Value::from("Jack Henry & Associates, Inc."),
                Value::from("38.81")
            ]
        );
        assert_eq!(table.rows()[1][1], Value::Empty);
    }

    #[test]
    fn test_tsv() {
        let table = parse_table(b"Ticker\tSector\nSNA\tIndustrial Goods\n".to_vec()).unwrap();
        assert_eq!(table.rows()[0][1], Value::from("Industrial Goods"));
    }

    #[test]
    fn test_ragged_csv_is_rejected() {
        let result = parse_table(b"Ticker,Company\nSNA,Snap-on,extra\n".to_vec());
        assert!(matches!(result, Err(UniverseError::RaggedRow { row: 0, .. })));
    }

    #[test]
    fn test_json_import() {
        let table = parse_table(br#"[{"Ticker": "SNA", "P/E": 17.25}]"#.to_vec()).unwrap();
        assert_eq!(table.rows()[0][1], Value::Number(17.25));
    }
}
