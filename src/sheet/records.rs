//! Record extraction from a located table

use indexmap::IndexMap;
use serde_json::Value;

use super::locator::Table;

/// One data row keyed by column label, in column order.
///
/// Blank cells are `None` and serialize as `null`.
pub type Record = IndexMap<String, Option<String>>;

/// Convert every data row into a record of trimmed values
pub fn extract_records(table: &Table) -> Vec<Record> {
    table
        .rows
        .iter()
        .map(|row| {
            table
                .labels
                .iter()
                .enumerate()
                .map(|(col, label)| {
                    let value = row
                        .get(col)
                        .and_then(|cell| cell.as_deref())
                        .map(str::trim)
                        .filter(|text| !text.is_empty())
                        .map(str::to_string);
                    (label.trim().to_string(), value)
                })
                .collect()
        })
        .collect()
}

/// Convert loosely-typed JSON objects into records.
///
/// Hand-edited intermediate files may carry numbers or booleans; those are
/// kept as their JSON text. Nested values are dropped.
pub fn records_from_json(rows: Vec<IndexMap<String, Value>>) -> Vec<Record> {
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(key, value)| {
                    let text = match value {
                        Value::String(s) => Some(s),
                        Value::Number(n) => Some(n.to_string()),
                        Value::Bool(b) => Some(b.to_string()),
                        Value::Null | Value::Array(_) | Value::Object(_) => None,
                    };
                    (key, text)
                })
                .collect()
        })
        .collect()
}
