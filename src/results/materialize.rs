use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::result_set::QueryResult;
use super::row::{Record, build_index};
use crate::codec::decode;
use crate::types::RowValues;

/// Turn an execute result payload (`cols`, `rows`, `affected_row_count`,
/// `last_insert_rowid`) into records.
///
/// Never fails: a payload whose `cols` or `rows` is missing or not a list yields no records,
/// and absent counters default to `0` / `None`.
#[must_use]
pub fn materialize(payload: &JsonValue) -> QueryResult {
    let affected = payload
        .get("affected_row_count")
        .and_then(json_to_i64)
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or(0);
    let last_insert_id = payload.get("last_insert_rowid").and_then(json_to_i64);

    let (Some(cols), Some(rows)) = (
        payload.get("cols").and_then(JsonValue::as_array),
        payload.get("rows").and_then(JsonValue::as_array),
    ) else {
        return QueryResult {
            affected,
            last_insert_id,
            ..QueryResult::default()
        };
    };

    let column_names = Arc::new(
        cols.iter()
            .enumerate()
            .map(|(i, col)| column_name(col, i))
            .collect::<Vec<_>>(),
    );
    let column_index = Arc::new(build_index(&column_names));

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(cells) = row.as_array() else {
            continue;
        };
        let mut values: Vec<RowValues> = cells.iter().map(decode).collect();

        if values.len() > column_names.len() {
            // Cells beyond the described columns are keyed by their position.
            let mut names = column_names.as_ref().clone();
            names.extend((names.len()..values.len()).map(|i| i.to_string()));
            records.push(Record::new(Arc::new(names), values));
            continue;
        }
        values.resize(column_names.len(), RowValues::Null);
        records.push(Record::with_index(
            Arc::clone(&column_names),
            values,
            Arc::clone(&column_index),
        ));
    }

    QueryResult {
        records,
        affected,
        last_insert_id,
        ..QueryResult::default()
    }
}

/// A column descriptor is either a bare name or an object with a `name` field.
fn column_name(col: &JsonValue, position: usize) -> String {
    match col {
        JsonValue::String(name) => name.clone(),
        JsonValue::Object(fields) => fields
            .get("name")
            .and_then(JsonValue::as_str)
            .map_or_else(|| position.to_string(), str::to_string),
        _ => position.to_string(),
    }
}

/// Counters arrive as JSON numbers or numeric strings depending on the server version.
fn json_to_i64(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
