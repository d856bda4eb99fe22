/*!
Frame model: all annotations sharing one capture timestamp.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};
use tracing::warn;
use uuid::Uuid;

use crate::scene::annotation::{Annotation, ANNOTATION_CATEGORIES};
use crate::tree;
use crate::types::{TranslateError, TranslateResult};

/// One frame of the scene.
///
/// Annotations are keyed by their id; the map is ordered so every downstream
/// traversal sees ascending annotation ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub id: u64,
    /// Decimal capture timestamp, literal source text.
    pub timestamp: String,
    pub annotations: BTreeMap<Uuid, Annotation>,
}

impl Frame {
    pub fn from_tree(value: &Value, path: &str) -> TranslateResult<Self> {
        let obj = tree::as_object(value, path)?;

        let id = parse_frame_id(obj, path)?;
        let timestamp = tree::get_decimal_text(obj, "timestamp", path)?;

        let annotations_path = format!("{}.annotations", path);
        let categories = tree::as_object(tree::get(obj, "annotations", path)?, &annotations_path)?;

        for key in categories.keys() {
            if !ANNOTATION_CATEGORIES.iter().any(|(name, _)| name == key) {
                warn!(
                    target: "uai-raillabel",
                    "ignoring unknown annotation category '{}' at {}",
                    key,
                    annotations_path
                );
            }
        }

        let mut annotations = BTreeMap::new();
        for (category, kind) in ANNOTATION_CATEGORIES {
            // Missing category keys are treated as empty sequences.
            let Some(entries) = categories.get(category) else {
                continue;
            };
            let category_path = format!("{}.{}", annotations_path, category);
            for (i, entry) in tree::as_array(entries, &category_path)?.iter().enumerate() {
                let annotation =
                    Annotation::from_tree(kind, entry, &format!("{}[{}]", category_path, i))?;
                let id = annotation.header().id;
                if annotations.insert(id, annotation).is_some() {
                    return Err(TranslateError::InvariantViolation(format!(
                        "duplicate annotation id {} at {}",
                        id, category_path
                    )));
                }
            }
        }

        Ok(Self { id, timestamp, annotations })
    }

    /// Emit this frame's target fragment, keyed by its decimal id text.
    ///
    /// Annotations are grouped per object and, within an object, bucketed by
    /// their variant's target tag. Stream sync fragments are the union over
    /// all sensor references seen in the frame.
    pub fn to_target(&self) -> TranslateResult<(String, Value)> {
        let mut streams: BTreeMap<String, Value> = BTreeMap::new();
        let mut objects: BTreeMap<String, BTreeMap<&'static str, Vec<Value>>> = BTreeMap::new();

        for annotation in self.annotations.values() {
            let tag = annotation.target_tag();
            let projection = annotation.to_target()?;
            streams
                .entry(projection.stream_id.clone())
                .or_insert(projection.stream_fragment);
            objects
                .entry(projection.object_id.to_string())
                .or_default()
                .entry(tag)
                .or_default()
                .push(projection.fragment);
        }

        let mut stream_map = Map::new();
        for (stream_id, fragment) in streams {
            stream_map.insert(stream_id, fragment);
        }

        let mut object_map = Map::new();
        for (object_id, tags) in objects {
            let mut object_data = Map::new();
            for (tag, fragments) in tags {
                object_data.insert(tag.to_string(), Value::Array(fragments));
            }
            object_map.insert(object_id, json!({ "object_data": object_data }));
        }

        let fragment = json!({
            "frame_properties": {
                "timestamp": self.timestamp,
                "streams": stream_map,
            },
            "objects": object_map,
        });
        Ok((self.id.to_string(), fragment))
    }
}

fn parse_frame_id(obj: &Map<String, Value>, path: &str) -> TranslateResult<u64> {
    let field_path = format!("{}.frameId", path);
    let value = tree::get(obj, "frameId", path)?;
    match value {
        // Canonical UAI form is integer text
        Value::String(text) => text.parse::<u64>().map_err(|_| TranslateError::TypeMismatch {
            path: field_path,
            expected: "non-negative integer text",
            got: format!("'{}'", text),
        }),
        Value::Number(n) => n.as_u64().ok_or_else(|| TranslateError::TypeMismatch {
            path: field_path,
            expected: "non-negative integer",
            got: n.to_string(),
        }),
        other => Err(TranslateError::TypeMismatch {
            path: field_path,
            expected: "non-negative integer text",
            got: tree::kind_name(other).to_string(),
        }),
    }
}
