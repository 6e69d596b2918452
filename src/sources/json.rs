//! JSON Pointer helpers over `serde_json`.
//!
//! Missing paths read as empty strings / empty lists. Scalars that are not
//! strings (numbers, booleans) are rendered with their JSON text.

use html_escape::decode_html_entities;
use serde_json::Value;

use crate::app::Result;

pub fn parse(body: &str) -> Result<Value> {
    Ok(serde_json::from_str(body)?)
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(decode_html_entities(s).trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Scalar at `pointer`, or an empty string.
pub fn str_at(value: &Value, pointer: &str) -> String {
    value.pointer(pointer).and_then(scalar).unwrap_or_default()
}

/// Scalars at `pointer`: a single scalar, or every scalar element of an array.
pub fn strings_at(value: &Value, pointer: &str) -> Vec<String> {
    match value.pointer(pointer) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar).collect(),
        Some(other) => scalar(other).into_iter().collect(),
        None => Vec::new(),
    }
}

/// `field` of every object in the array at `pointer`.
pub fn field_of_each(value: &Value, pointer: &str, field: &str) -> Vec<String> {
    array_at(value, pointer)
        .iter()
        .filter_map(|item| item.pointer(field).and_then(scalar))
        .collect()
}

pub fn array_at<'a>(value: &'a Value, pointer: &str) -> &'a [Value] {
    value
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Non-negative integer at `pointer`; numeric strings are accepted.
pub fn u64_at(value: &Value, pointer: &str) -> Option<u64> {
    match value.pointer(pointer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
