//! Conversion between [`RowValues`] and the pipeline's tagged wire values.
//!
//! Outgoing integers and floats travel as decimal strings so no precision is lost in JSON
//! numbers. Incoming cells are decoded leniently: anything unrecognised becomes NULL.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::SqlPipelineError;
use crate::types::RowValues;

/// One argument as it appears in a statement's `args` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TypedValue {
    Null,
    Integer { value: String },
    Float { value: String },
    Text { value: String },
    Blob { base64: String },
}

/// Encode a host value for the wire.
///
/// # Errors
/// Returns `SqlPipelineError::ParameterError` for NaN or infinite floats, which the remote
/// cannot represent.
pub fn encode(value: &RowValues) -> Result<TypedValue, SqlPipelineError> {
    let typed = match value {
        RowValues::Null => TypedValue::Null,
        RowValues::Int(i) => TypedValue::Integer {
            value: i.to_string(),
        },
        RowValues::Float(f) => {
            if !f.is_finite() {
                return Err(SqlPipelineError::ParameterError(format!(
                    "float parameter must be finite, got {f}"
                )));
            }
            // `Display` for f64 is the shortest string that parses back to the same bits.
            TypedValue::Float {
                value: f.to_string(),
            }
        }
        RowValues::Text(s) => TypedValue::Text { value: s.clone() },
        RowValues::Blob(bytes) => TypedValue::Blob {
            base64: BASE64.encode(bytes),
        },
    };
    Ok(typed)
}

/// Encode a full parameter list, preserving order.
///
/// # Errors
/// Fails on the first parameter [`encode`] rejects.
pub fn encode_params(params: &[RowValues]) -> Result<Vec<TypedValue>, SqlPipelineError> {
    params.iter().map(encode).collect()
}

/// Decode one result cell.
///
/// A cell is normally an object carrying a `value` or a `base64` field (plus an optional
/// `type` tag). `value` wins when both are present; a cell with neither decodes to NULL.
#[must_use]
pub fn decode(cell: &JsonValue) -> RowValues {
    let JsonValue::Object(fields) = cell else {
        return decode_untagged(cell);
    };
    let tag = fields.get("type").and_then(JsonValue::as_str);

    if let Some(value) = fields.get("value") {
        return match tag {
            Some("integer") => decode_integer(value),
            Some("float") => decode_float(value),
            Some("null") => RowValues::Null,
            _ => decode_untagged(value),
        };
    }
    if let Some(encoded) = fields.get("base64").and_then(JsonValue::as_str) {
        return decode_base64(encoded);
    }
    RowValues::Null
}

fn decode_untagged(value: &JsonValue) -> RowValues {
    match value {
        JsonValue::String(s) => RowValues::Text(s.clone()),
        JsonValue::Number(n) => n
            .as_i64()
            .map(RowValues::Int)
            .or_else(|| n.as_f64().map(RowValues::Float))
            .unwrap_or(RowValues::Null),
        JsonValue::Bool(b) => RowValues::Int(i64::from(*b)),
        _ => RowValues::Null,
    }
}

fn decode_integer(value: &JsonValue) -> RowValues {
    match value {
        JsonValue::String(s) => s.parse().map_or(RowValues::Null, RowValues::Int),
        JsonValue::Number(n) => n.as_i64().map_or(RowValues::Null, RowValues::Int),
        _ => RowValues::Null,
    }
}

fn decode_float(value: &JsonValue) -> RowValues {
    match value {
        JsonValue::String(s) => s.parse().map_or(RowValues::Null, RowValues::Float),
        JsonValue::Number(n) => n.as_f64().map_or(RowValues::Null, RowValues::Float),
        _ => RowValues::Null,
    }
}

fn decode_base64(encoded: &str) -> RowValues {
    // The remote may strip padding.
    let trimmed = encoded.trim_end_matches('=');
    base64::engine::general_purpose::STANDARD_NO_PAD
        .decode(trimmed)
        .map_or(RowValues::Null, RowValues::Blob)
}
