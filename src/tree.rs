/*!
Tagged-tree field accessors.

The UAI document is navigated as a generic `serde_json::Value` tree. These
helpers centralize the required/optional field extraction so every parse
failure reports the exact breadcrumb path of the offending value.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::types::{TranslateError, TranslateResult};

/// Human-readable kind name of a JSON value, used in error messages.
pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(path: &str, expected: &'static str, value: &Value) -> TranslateError {
    TranslateError::TypeMismatch {
        path: path.to_string(),
        expected,
        got: kind_name(value).to_string(),
    }
}

/// Interpret a value as an object map.
pub(crate) fn as_object<'a>(
    value: &'a Value,
    path: &str,
) -> TranslateResult<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| mismatch(path, "object", value))
}

/// Interpret a value as an array.
pub(crate) fn as_array<'a>(value: &'a Value, path: &str) -> TranslateResult<&'a Vec<Value>> {
    value.as_array().ok_or_else(|| mismatch(path, "array", value))
}

/// Look up a required key.
pub(crate) fn get<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> TranslateResult<&'a Value> {
    obj.get(key)
        .ok_or_else(|| TranslateError::MissingField(format!("{}.{}", path, key)))
}

/// Required text field.
pub(crate) fn get_str(obj: &Map<String, Value>, key: &str, path: &str) -> TranslateResult<String> {
    let value = get(obj, key, path)?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| mismatch(&format!("{}.{}", path, key), "string", value))
}

/// Required floating field. Integers are accepted and widened.
pub(crate) fn get_f64(obj: &Map<String, Value>, key: &str, path: &str) -> TranslateResult<f64> {
    let value = get(obj, key, path)?;
    value
        .as_f64()
        .ok_or_else(|| mismatch(&format!("{}.{}", path, key), "number", value))
}

/// Required non-negative integer field.
pub(crate) fn get_u64(obj: &Map<String, Value>, key: &str, path: &str) -> TranslateResult<u64> {
    let value = get(obj, key, path)?;
    value
        .as_u64()
        .ok_or_else(|| mismatch(&format!("{}.{}", path, key), "non-negative integer", value))
}

/// Required decimal timestamp, kept as literal text.
///
/// Canonical UAI form is a decimal string; a bare JSON number is accepted and
/// its literal representation used. The text is never parsed into binary
/// floating point.
pub(crate) fn get_decimal_text(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
) -> TranslateResult<String> {
    let value = get(obj, key, path)?;
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(mismatch(&format!("{}.{}", path, key), "decimal string", other)),
    }
}

/// Required UUID field in canonical 8-4-4-4-12 hex text.
pub(crate) fn get_uuid(obj: &Map<String, Value>, key: &str, path: &str) -> TranslateResult<Uuid> {
    let field_path = format!("{}.{}", path, key);
    let value = get(obj, key, path)?;
    let text = value
        .as_str()
        .ok_or_else(|| mismatch(&field_path, "string", value))?;
    Uuid::parse_str(text).map_err(|_| TranslateError::InvalidUuid {
        path: field_path,
        text: text.to_string(),
    })
}

/// Required sequence of floats.
pub(crate) fn get_f64_array(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
) -> TranslateResult<Vec<f64>> {
    let field_path = format!("{}.{}", path, key);
    let array = as_array(get(obj, key, path)?, &field_path)?;
    parse_f64_items(array, &field_path)
}

/// Optional sequence of floats (absent key parses to `None`).
pub(crate) fn opt_f64_array(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
) -> TranslateResult<Option<Vec<f64>>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let field_path = format!("{}.{}", path, key);
            let array = as_array(value, &field_path)?;
            Ok(Some(parse_f64_items(array, &field_path)?))
        }
    }
}

fn parse_f64_items(array: &[Value], path: &str) -> TranslateResult<Vec<f64>> {
    let mut out = Vec::with_capacity(array.len());
    for (i, item) in array.iter().enumerate() {
        out.push(
            item.as_f64()
                .ok_or_else(|| mismatch(&format!("{}[{}]", path, i), "number", item))?,
        );
    }
    Ok(out)
}
