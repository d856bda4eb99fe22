/*!
Projection of a parsed UAI scene into the RailLabel/OpenLabel v1 document.

The translator inverts the source's frame-first grouping into the target's
object-first grouping in two passes: pass 1 walks frames in ascending numeric
order (and annotations in ascending id order within each frame) collecting
per-object observations; pass 2 materializes `frame_intervals`,
`object_data_pointers` and the object table from those observations. All maps
are emitted in sorted key order so the output is deterministic.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

pub mod attributes;
pub mod intervals;
pub mod streams;

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{json, Map, Value};

use crate::scene::Scene;
use crate::translate::attributes::bucket_for;
use crate::translate::intervals::{compress_intervals, intervals_to_target};
use crate::translate::streams::StreamType;
use crate::types::{TranslateError, TranslateResult};

/// Subschema version stamped into emitted metadata.
pub const SUBSCHEMA_VERSION: &str = "1.0.0";

/// Hook for mapping vendor class names onto target taxonomy names.
///
/// Identity for now; the vendor-to-catalog mapping table is not yet defined,
/// so names pass through unchanged.
pub fn translate_class_name(class_name: &str) -> &str {
    class_name
}

/// Hook for mapping vendor coordinate-system uids onto target stream names.
///
/// Identity for now, mirroring [`translate_class_name`].
pub fn translate_coordinate_system_uid(uid: &str) -> &str {
    uid
}

/// Per-object, per-target-tag observations collected in pass 1.
#[derive(Debug, Default)]
struct TagObservations {
    frames: BTreeSet<u64>,
    /// Attribute name → bucket; first observation wins.
    attribute_pointers: BTreeMap<String, &'static str>,
}

/// Per-object observations collected in pass 1.
#[derive(Debug)]
struct ObjectObservations {
    class_name: String,
    frames: BTreeSet<u64>,
    tags: BTreeMap<&'static str, TagObservations>,
}

impl Scene {
    /// Emit the complete target document, `{"openlabel": {...}}`.
    pub fn to_target(&self) -> TranslateResult<Value> {
        let reference_frame = &self.metadata.coordinate_system_reference;

        // Calibrated coordinate systems and the streams they define.
        let mut coordinate_systems: BTreeMap<String, Value> = BTreeMap::new();
        let mut streams: BTreeMap<String, Value> = BTreeMap::new();
        for (uid, system) in &self.coordinate_systems {
            let (system_fragment, stream_fragment) = system.to_target(reference_frame)?;
            let uid = translate_coordinate_system_uid(uid).to_string();
            streams.insert(uid.clone(), stream_fragment);
            coordinate_systems.insert(uid, system_fragment);
        }
        if !coordinate_systems.contains_key(reference_frame.as_str()) {
            coordinate_systems.insert(
                reference_frame.clone(),
                json!({
                    "type": "local",
                    "parent_frame": "",
                    "children": [],
                }),
            );
        }

        // Pass 1: frames in ascending numeric order, annotations in ascending
        // id order; emit frame fragments and collect object observations.
        let mut frame_map = Map::new();
        let mut objects: BTreeMap<String, ObjectObservations> = BTreeMap::new();
        for (frame_id, frame) in &self.frames {
            let (frame_id_text, fragment) = frame.to_target()?;
            frame_map.insert(frame_id_text, fragment);

            for (annotation_id, annotation) in &frame.annotations {
                let header = annotation.header();

                let stream_id = header.sensor.sensor_type.clone();
                streams.entry(stream_id.clone()).or_insert_with(|| {
                    json!({ "type": StreamType::classify(&stream_id).as_str() })
                });

                let observations = objects
                    .entry(header.object_id.to_string())
                    .or_insert_with(|| ObjectObservations {
                        class_name: header.class_name.clone(),
                        frames: BTreeSet::new(),
                        tags: BTreeMap::new(),
                    });
                if observations.class_name != header.class_name {
                    return Err(TranslateError::InvariantViolation(format!(
                        "object {} changes class from '{}' to '{}' in frame {}",
                        header.object_id, observations.class_name, header.class_name, frame_id
                    )));
                }
                observations.frames.insert(*frame_id);

                let tag = observations.tags.entry(annotation.target_tag()).or_default();
                tag.frames.insert(*frame_id);
                for (name, value) in &header.attributes {
                    let bucket = bucket_for(
                        value,
                        &format!("annotations.{}.attributes.{}", annotation_id, name),
                    )?;
                    tag.attribute_pointers.entry(name.clone()).or_insert(bucket);
                }
            }
        }

        // Pass 2: materialize the object table.
        let mut object_map = Map::new();
        for (object_id, observations) in objects {
            let class_name = translate_class_name(&observations.class_name);

            let mut pointers = Map::new();
            for (tag, tag_observations) in observations.tags {
                let mut attribute_pointers = Map::new();
                for (name, bucket) in tag_observations.attribute_pointers {
                    attribute_pointers.insert(name, json!(bucket));
                }
                pointers.insert(
                    tag.to_string(),
                    json!({
                        "type": tag,
                        "frame_intervals":
                            intervals_to_target(&compress_intervals(&tag_observations.frames)),
                        "attribute_pointers": attribute_pointers,
                    }),
                );
            }

            object_map.insert(
                object_id,
                json!({
                    "name": class_name,
                    "type": class_name,
                    "frame_intervals":
                        intervals_to_target(&compress_intervals(&observations.frames)),
                    "object_data_pointers": pointers,
                }),
            );
        }

        let mut stream_map = Map::new();
        for (stream_id, fragment) in streams {
            stream_map.insert(stream_id, fragment);
        }
        let mut coordinate_system_map = Map::new();
        for (uid, fragment) in coordinate_systems {
            coordinate_system_map.insert(uid, fragment);
        }

        let present_frames: BTreeSet<u64> = self.frames.keys().copied().collect();

        Ok(json!({
            "openlabel": {
                "metadata": self.metadata.to_target(SUBSCHEMA_VERSION),
                "coordinate_systems": coordinate_system_map,
                "streams": stream_map,
                "objects": object_map,
                "frames": frame_map,
                "frame_intervals": intervals_to_target(&compress_intervals(&present_frames)),
            }
        }))
    }
}
