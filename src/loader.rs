// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
High-level load/translate/save API.

Convenience wrappers around the pure core: the engine itself only consumes
and produces tagged trees; these functions add JSON text and file handling
for callers that work with documents on disk.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::scene::Scene;
use crate::types::TranslateResult;

/// Parse a UAI scene from a JSON string.
pub fn load_scene_from_json(json_str: &str) -> TranslateResult<Scene> {
    let tree: Value = serde_json::from_str(json_str)?;
    Scene::from_tree(&tree)
}

/// Load a UAI scene from a JSON file.
pub fn load_scene_from_file<P: AsRef<Path>>(path: P) -> TranslateResult<Scene> {
    debug!(target: "uai-raillabel", "loading UAI scene from {}", path.as_ref().display());
    let json_str = fs::read_to_string(path)?;
    load_scene_from_json(&json_str)
}

/// Serialize a translated document to pretty-printed JSON text.
pub fn save_openlabel_to_json(document: &Value) -> TranslateResult<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Write a translated document to a JSON file.
pub fn save_openlabel_to_file<P: AsRef<Path>>(document: &Value, path: P) -> TranslateResult<()> {
    let json_str = save_openlabel_to_json(document)?;
    fs::write(&path, json_str)?;
    debug!(target: "uai-raillabel", "wrote OpenLabel document to {}", path.as_ref().display());
    Ok(())
}

/// Translate one UAI export file into one RailLabel/OpenLabel file.
pub fn translate_file<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> TranslateResult<()> {
    let scene = load_scene_from_file(&source)?;
    let document = scene.to_target()?;
    save_openlabel_to_file(&document, &destination)?;
    info!(
        target: "uai-raillabel",
        "translated {} ({} frames, {} coordinate systems) to {}",
        source.as_ref().display(),
        scene.frames.len(),
        scene.coordinate_systems.len(),
        destination.as_ref().display()
    );
    Ok(())
}
