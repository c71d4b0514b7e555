//! Spreadsheet workbooks: reading with calamine, writing with rust_xlsxwriter.

use super::Sheet;
use crate::error::{Result, UniverseError};
use crate::table::DescriptiveTable;
use crate::value::Value;
use calamine::{Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// Read every worksheet of an XLSX or XLS workbook held in memory.
///
/// The first row of each sheet is its header; a sheet without cells
/// becomes an empty table. Blank rows at the bottom of an XLSX sheet are
/// kept up to the sheet's declared dimension.
pub fn read_sheets(bytes: Vec<u8>) -> Result<Vec<Sheet>> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let mut sheets = Vec::new();
    for title in workbook.sheet_names() {
        let last_row = declared_last_row(&mut workbook, &title);
        let range = workbook.worksheet_range(&title)?;
        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|header| header.iter().map(|cell| cell_value(cell).to_string()).collect())
            .unwrap_or_default();
        let mut rows: Vec<Vec<Value>> = rows
            .map(|row| row.iter().map(cell_value).collect())
            .collect();

        if let (Some((first_row, _)), Some(last_row)) = (range.start(), last_row) {
            let declared = last_row.saturating_sub(first_row) as usize;
            if declared > rows.len() {
                rows.resize(declared, vec![Value::Empty; headers.len()]);
            }
        }
        sheets.push(Sheet::new(title, DescriptiveTable::from_rows(headers, rows)?));
    }
    Ok(sheets)
}

/// Last row of the `<dimension>` an XLSX sheet declares. calamine drops
/// cells without a value, so trailing blank rows only show up here.
fn declared_last_row<RS: Read + Seek>(workbook: &mut Sheets<RS>, title: &str) -> Option<u32> {
    match workbook {
        Sheets::Xlsx(xlsx) => xlsx
            .worksheet_cells_reader(title)
            .ok()
            .map(|reader| reader.dimensions().end.0),
        _ => None,
    }
}

/// Convert a calamine cell. Date cells become ISO text.
fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Value::text(s.as_str()),
        Data::Float(f) => Value::Number(*f),
        Data::Int(i) => Value::Number(*i as f64),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(dt) if dt.time() == chrono::NaiveTime::MIN => {
                Value::Text(dt.date().format("%Y-%m-%d").to_string())
            }
            Some(dt) => Value::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Value::Number(dt.as_f64()),
        },
        Data::Error(e) => Value::Text(e.to_string()),
    }
}

/// Write `sheets` as an XLSX workbook at `path`, replacing any existing file.
pub fn write_sheets(path: &Path, sheets: &[Sheet]) -> Result<()> {
    let mut workbook = Workbook::new();
    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.title.as_str())?;
        write_table(worksheet, &sheet.table)?;
    }
    workbook.save(path)?;
    Ok(())
}

/// Empty cells are written as unformatted blanks. They add nothing to the
/// sheet data but extend its dimension, which keeps blank rows readable.
fn write_table(worksheet: &mut Worksheet, table: &DescriptiveTable) -> Result<()> {
    let blank = Format::new();
    for (col, header) in table.headers().iter().enumerate() {
        worksheet.write_string(0, column_number(col)?, header.as_str())?;
    }
    for (idx, row) in table.rows().iter().enumerate() {
        let row_number = u32::try_from(idx + 1)
            .map_err(|_| UniverseError::Parse(format!("row {idx} exceeds the sheet limit")))?;
        for (col, value) in row.iter().enumerate() {
            let col = column_number(col)?;
            match value {
                Value::Empty => {
                    worksheet.write_blank(row_number, col, &blank)?;
                }
                Value::Bool(b) => {
                    worksheet.write_boolean(row_number, col, *b)?;
                }
                Value::Number(n) => {
                    worksheet.write_number(row_number, col, *n)?;
                }
                Value::Text(s) => {
                    worksheet.write_string(row_number, col, s.as_str())?;
                }
            }
        }
    }
    Ok(())
}

fn column_number(col: usize) -> Result<u16> {
    u16::try_from(col)
        .map_err(|_| UniverseError::Parse(format!("column {col} exceeds the sheet limit")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workbook_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        let table = DescriptiveTable::from_rows(
            vec!["Ticker".to_string(), "P/E".to_string(), "Listed".to_string()],
            vec![
                vec!["SNA".into(), Value::Number(17.25), Value::Bool(true)],
                vec!["DRE".into(), Value::Empty, "yes".into()],
            ],
        )
        .unwrap();

        write_sheets(&path, &[Sheet::new("equities", table.clone())]).unwrap();
        let sheets = read_sheets(std::fs::read(&path).unwrap()).unwrap();

        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].title, "equities");
        assert_eq!(sheets[0].table, table);
    }

    #[test]
    fn test_blank_rows_survive_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.xlsx");
        let table = DescriptiveTable::from_rows(
            vec!["Ticker".to_string(), "Company".to_string()],
            vec![
                vec!["SNA".into(), "Snap-on".into()],
                vec![Value::Empty, Value::Empty],
                vec![Value::Empty, Value::Empty],
            ],
        )
        .unwrap();

        write_sheets(&path, &[Sheet::new("equities", table.clone())]).unwrap();
        let sheets = read_sheets(std::fs::read(&path).unwrap()).unwrap();

        assert_eq!(sheets[0].table.height(), 3);
        assert_eq!(sheets[0].table, table);
    }

    #[test]
    fn test_date_cells_become_iso_text() {
        let cell = Data::DateTimeIso("2018-02-05".to_string());
        assert_eq!(cell_value(&cell), Value::from("2018-02-05"));
        assert_eq!(cell_value(&Data::Int(3)), Value::Number(3.0));
        assert_eq!(cell_value(&Data::String(String::new())), Value::Empty);
    }
}
