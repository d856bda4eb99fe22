/*!
Attribute classification into target-schema type buckets.

The target schema groups an annotation's free-form attributes into typed
buckets ("text", "num", "boolean", "vec"). Classification happens on the
runtime kind of each value; booleans are tested before numbers so they never
leak into the "num" bucket.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use serde_json::{json, Map, Value};

use crate::tree::kind_name;
use crate::types::{TranslateError, TranslateResult};

/// Bucket names in target-schema emission order.
const BUCKET_ORDER: [&str; 4] = ["text", "num", "boolean", "vec"];

/// Classify one attribute value into its bucket name.
pub fn bucket_for(value: &Value, path: &str) -> TranslateResult<&'static str> {
    match value {
        Value::String(_) => Ok("text"),
        Value::Bool(_) => Ok("boolean"),
        Value::Number(_) => Ok("num"),
        Value::Array(_) => Ok("vec"),
        other => Err(TranslateError::UnsupportedAttributeType {
            path: path.to_string(),
            kind: kind_name(other),
            value: other.to_string(),
        }),
    }
}

/// Build the bucketed `attributes` fragment for an annotation.
///
/// Entries keep the iteration order of the source mapping within each bucket;
/// empty buckets are omitted.
pub fn bucket_attributes(attributes: &Map<String, Value>, path: &str) -> TranslateResult<Value> {
    let mut buckets: Map<String, Value> = Map::new();

    for (name, value) in attributes {
        let bucket = bucket_for(value, &format!("{}.{}", path, name))?;
        let entries = buckets
            .entry(bucket.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(entries) = entries {
            entries.push(json!({"name": name, "val": value}));
        }
    }

    let mut ordered = Map::new();
    for bucket in BUCKET_ORDER {
        if let Some(entries) = buckets.remove(bucket) {
            ordered.insert(bucket.to_string(), entries);
        }
    }
    Ok(Value::Object(ordered))
}
