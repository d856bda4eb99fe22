/*!
Typed model of a UAI scene.

This module parses the vendor export document (a generic tagged tree) into
immutable value objects: primitives, annotations, frames and the scene root.
Parsing is strict about shape and reports breadcrumbed paths; sections that
the exporter legitimately omits (empty scenes) default to empty.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

pub mod annotation;
pub mod frame;
pub mod primitives;

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

pub use annotation::{Annotation, AnnotationHeader, AnnotationKind, AnnotationProjection};
pub use frame::Frame;
pub use primitives::{CoordinateSystem, Metadata, Point3d, Quaternion, SensorReference, Size3d};

use crate::tree;
use crate::types::{TranslateError, TranslateResult};

/// The root of a parsed UAI scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub metadata: Metadata,
    /// Coordinate systems keyed by uid.
    pub coordinate_systems: BTreeMap<String, CoordinateSystem>,
    /// Frames keyed by numeric id.
    pub frames: BTreeMap<u64, Frame>,
}

impl Scene {
    /// Parse a whole UAI document.
    pub fn from_tree(value: &Value) -> TranslateResult<Self> {
        let obj = tree::as_object(value, "")?;

        let metadata = Metadata::from_tree(
            obj.get("metadata")
                .ok_or_else(|| TranslateError::MissingField("metadata".to_string()))?,
            "metadata",
        )?;

        let mut coordinate_systems = BTreeMap::new();
        match obj.get("coordinateSystems") {
            None => warn!(target: "uai-raillabel", "document has no coordinateSystems section"),
            Some(section) => {
                for (i, entry) in tree::as_array(section, "coordinateSystems")?.iter().enumerate() {
                    let system =
                        CoordinateSystem::from_tree(entry, &format!("coordinateSystems[{}]", i))?;
                    let uid = system.uid.clone();
                    if coordinate_systems.insert(uid.clone(), system).is_some() {
                        return Err(TranslateError::InvariantViolation(format!(
                            "duplicate coordinate system uid '{}'",
                            uid
                        )));
                    }
                }
            }
        }

        let mut frames = BTreeMap::new();
        match obj.get("frames") {
            None => warn!(target: "uai-raillabel", "document has no frames section"),
            Some(section) => {
                for (i, entry) in tree::as_array(section, "frames")?.iter().enumerate() {
                    let frame = Frame::from_tree(entry, &format!("frames[{}]", i))?;
                    let id = frame.id;
                    if frames.insert(id, frame).is_some() {
                        return Err(TranslateError::InvariantViolation(format!(
                            "duplicate frame id {}",
                            id
                        )));
                    }
                }
            }
        }

        Ok(Self { metadata, coordinate_systems, frames })
    }
}
