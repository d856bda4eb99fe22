/*!
# UAI → RailLabel / OpenLabel Scene Translation

One-way, batch translation of annotated-scene exports from the UAI ("T4")
vendor format into RailLabel / OpenLabel v1 documents:

- Typed scene model parsed from a generic tagged tree (`serde_json::Value`)
  with breadcrumbed errors
- Five annotation variants: 2D/3D bounding boxes, 2D polygons and polylines,
  3D point-index segmentations
- Sensor classification into target stream types (camera/lidar/radar/other)
- Frame-first → object-first index inversion with computed `frame_intervals`
  and `object_data_pointers`

## Architecture

```text
tagged tree ──Scene::from_tree──▶ Scene ──Scene::to_target──▶ tagged tree
 (UAI JSON)                     (typed model)              ({"openlabel": …})
```

The core is pure and synchronous: parsing builds immutable value objects,
translation is a total function of the parsed scene. File handling lives in
the thin [`loader`] module.

## Modules

- `scene` - UAI object model and parsing
- `translate` - projection into the target schema
- `loader` - load/translate/save convenience API

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

pub mod loader;
pub mod scene;
pub mod translate;
pub mod types;

mod tree;

// Re-export commonly used types
pub use loader::{
    load_scene_from_file, load_scene_from_json, save_openlabel_to_file, save_openlabel_to_json,
    translate_file,
};
pub use scene::Scene;
pub use translate::{streams::StreamType, SUBSCHEMA_VERSION};
pub use types::{TranslateError, TranslateResult};
