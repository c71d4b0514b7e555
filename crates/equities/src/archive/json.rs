//! JSON datasets and databooks.
//!
//! A dataset is an array of row objects, an array of arrays whose first
//! element is the header, or an object with a `data` array of either kind.
//! A databook is an array of `{"title": ..., "data": [...]}` sheets.

use super::Sheet;
use crate::error::{Result, UniverseError};
use crate::table::DescriptiveTable;
use crate::value::Value;
use serde_json::Value as Json;

/// Parse a JSON databook. A bare dataset is read as a single sheet.
pub fn read_sheets(bytes: &[u8]) -> Result<Vec<Sheet>> {
    let json: Json = serde_json::from_slice(bytes)?;
    match &json {
        Json::Array(items) if !items.is_empty() && items.iter().all(is_sheet) => items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let title = item
                    .get("title")
                    .and_then(Json::as_str)
                    .map_or_else(|| format!("Sheet{}", idx + 1), str::to_string);
                Ok(Sheet::new(title, table_from_json(item)?))
            })
            .collect(),
        _ => Ok(vec![Sheet::new("Sheet1", table_from_json(&json)?)]),
    }
}

fn is_sheet(item: &Json) -> bool {
    item.as_object()
        .is_some_and(|obj| obj.contains_key("data") && (obj.len() == 1 || obj.contains_key("title")))
}

/// Convert a JSON dataset into a table.
pub fn table_from_json(json: &Json) -> Result<DescriptiveTable> {
    match json {
        Json::Object(obj) => match obj.get("data") {
            Some(data) => table_from_json(data),
            None => Err(UniverseError::Parse(
                "JSON object has no `data` array".to_string(),
            )),
        },
        Json::Array(items) => match items.first() {
            None => Ok(DescriptiveTable::new()),
            Some(Json::Array(_)) => table_from_arrays(items),
            Some(Json::Object(_)) => table_from_objects(items),
            Some(other) => Err(UniverseError::Parse(format!(
                "expected rows as arrays or objects, found {other}"
            ))),
        },
        other => Err(UniverseError::Parse(format!(
            "expected a JSON array of rows, found {other}"
        ))),
    }
}

/// Headers come from the keys of the first object, in order. Keys missing
/// from later rows read as empty; keys absent from the first row are ignored.
fn table_from_objects(items: &[Json]) -> Result<DescriptiveTable> {
    let headers: Vec<String> = items
        .first()
        .and_then(Json::as_object)
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default();

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let obj = item
            .as_object()
            .ok_or_else(|| UniverseError::Parse(format!("row {idx} is not an object")))?;
        rows.push(
            headers
                .iter()
                .map(|h| obj.get(h).map_or(Value::Empty, Value::from_json))
                .collect(),
        );
    }
    DescriptiveTable::from_rows(headers, rows)
}

fn table_from_arrays(items: &[Json]) -> Result<DescriptiveTable> {
    let mut arrays = items.iter().enumerate().map(|(idx, item)| {
        item.as_array()
            .ok_or_else(|| UniverseError::Parse(format!("row {idx} is not an array")))
    });
    let headers: Vec<String> = match arrays.next() {
        Some(header) => header?
            .iter()
            .map(|cell| Value::from_json(cell).to_string())
            .collect(),
        None => Vec::new(),
    };
    let rows = arrays
        .map(|row| Ok(row?.iter().map(Value::from_json).collect::<Vec<_>>()))
        .collect::<Result<Vec<_>>>()?;
    DescriptiveTable::from_rows(headers, rows)
}
