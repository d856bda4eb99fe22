/*!
Annotation variants of the UAI scene model.

An annotation is one labeled geometric primitive inside a frame. The five
variants share a common header (identity, object identity, class, free-form
attributes, sensor reference) and differ completely in geometry payload, so
they form a closed sum type; the projector matches exhaustively.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use serde_json::{json, Map, Value};
use tracing::warn;
use uuid::Uuid;

use crate::scene::primitives::{Point3d, Quaternion, SensorReference, Size3d};
use crate::translate::attributes::bucket_attributes;
use crate::tree;
use crate::types::{TranslateError, TranslateResult};

/// Fields shared by every annotation variant.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationHeader {
    pub id: Uuid,
    pub object_id: Uuid,
    pub class_name: String,
    /// Free-form vendor attributes, in source order.
    pub attributes: Map<String, Value>,
    pub sensor: SensorReference,
}

impl AnnotationHeader {
    fn from_tree(obj: &Map<String, Value>, path: &str) -> TranslateResult<Self> {
        let attributes = match obj.get("attributes") {
            None => Map::new(),
            Some(value) => tree::as_object(value, &format!("{}.attributes", path))?.clone(),
        };
        Ok(Self {
            id: tree::get_uuid(obj, "id", path)?,
            object_id: tree::get_uuid(obj, "objectId", path)?,
            class_name: tree::get_str(obj, "className", path)?,
            attributes,
            sensor: SensorReference::from_tree(
                tree::get(obj, "sensor", path)?,
                &format!("{}.sensor", path),
            )?,
        })
    }
}

/// The annotation category keys of a UAI frame, with their variant kinds.
pub const ANNOTATION_CATEGORIES: [(&str, AnnotationKind); 5] = [
    ("2D_BOUNDING_BOX", AnnotationKind::BoundingBox2d),
    ("3D_BOUNDING_BOX", AnnotationKind::BoundingBox3d),
    ("2D_POLYGON", AnnotationKind::Polygon2d),
    ("2D_POLYLINE", AnnotationKind::Polyline2d),
    ("3D_SEGMENTATION", AnnotationKind::Segmentation3d),
];

/// Variant discriminant used while parsing category sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    BoundingBox2d,
    BoundingBox3d,
    Polygon2d,
    Polyline2d,
    Segmentation3d,
}

/// One labeled geometric primitive of a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// Axis-aligned image-plane box. Camera modality.
    BoundingBox2d {
        header: AnnotationHeader,
        x_min: f64,
        y_min: f64,
        x_max: f64,
        y_max: f64,
    },
    /// Oriented cuboid. Lidar/radar modality.
    BoundingBox3d {
        header: AnnotationHeader,
        center: Point3d,
        size: Size3d,
        quaternion: Quaternion,
    },
    /// Closed image-plane curve.
    Polygon2d {
        header: AnnotationHeader,
        points: Vec<(f64, f64)>,
    },
    /// Open image-plane curve.
    Polyline2d {
        header: AnnotationHeader,
        points: Vec<(f64, f64)>,
    },
    /// Point-index membership in a referenced point cloud.
    Segmentation3d {
        header: AnnotationHeader,
        associated_points: Vec<u64>,
        number_of_points: u64,
    },
}

/// Result of projecting one annotation into the target schema.
#[derive(Debug, Clone)]
pub struct AnnotationProjection {
    /// The annotation fragment (name/val/coordinate_system/attributes).
    pub fragment: Value,
    pub object_id: Uuid,
    pub class_name: String,
    /// Stream id this annotation's data lives in.
    pub stream_id: String,
    /// Per-frame sync fragment of the producing sensor.
    pub stream_fragment: Value,
}

impl Annotation {
    /// Parse one annotation of a known category.
    pub fn from_tree(kind: AnnotationKind, value: &Value, path: &str) -> TranslateResult<Self> {
        let obj = tree::as_object(value, path)?;
        let header = AnnotationHeader::from_tree(obj, path)?;
        let geometry_path = format!("{}.geometry", path);
        let geometry = tree::as_object(tree::get(obj, "geometry", path)?, &geometry_path)?;

        match kind {
            AnnotationKind::BoundingBox2d => Ok(Annotation::BoundingBox2d {
                header,
                x_min: tree::get_f64(geometry, "xMin", &geometry_path)?,
                y_min: tree::get_f64(geometry, "yMin", &geometry_path)?,
                x_max: tree::get_f64(geometry, "xMax", &geometry_path)?,
                y_max: tree::get_f64(geometry, "yMax", &geometry_path)?,
            }),
            AnnotationKind::BoundingBox3d => Ok(Annotation::BoundingBox3d {
                header,
                center: Point3d::from_tree(
                    tree::get(geometry, "center", &geometry_path)?,
                    &format!("{}.center", geometry_path),
                )?,
                size: Size3d::from_tree(
                    tree::get(geometry, "size", &geometry_path)?,
                    &format!("{}.size", geometry_path),
                )?,
                quaternion: Quaternion::from_tree(
                    tree::get(geometry, "quaternion", &geometry_path)?,
                    &format!("{}.quaternion", geometry_path),
                )?,
            }),
            AnnotationKind::Polygon2d => Ok(Annotation::Polygon2d {
                header,
                points: parse_points(geometry, &geometry_path)?,
            }),
            AnnotationKind::Polyline2d => Ok(Annotation::Polyline2d {
                header,
                points: parse_points(geometry, &geometry_path)?,
            }),
            AnnotationKind::Segmentation3d => {
                let associated_points = parse_point_indices(geometry, &geometry_path)?;
                let number_of_points = tree::get_u64(geometry, "numberOfPointsInBox", &geometry_path)?;
                // Advisory only; the source does not enforce consistency either.
                if number_of_points as usize != associated_points.len() {
                    warn!(
                        target: "uai-raillabel",
                        "numberOfPointsInBox {} differs from {} associated points at {}",
                        number_of_points,
                        associated_points.len(),
                        path
                    );
                }
                Ok(Annotation::Segmentation3d {
                    header,
                    associated_points,
                    number_of_points,
                })
            }
        }
    }

    pub fn header(&self) -> &AnnotationHeader {
        match self {
            Annotation::BoundingBox2d { header, .. }
            | Annotation::BoundingBox3d { header, .. }
            | Annotation::Polygon2d { header, .. }
            | Annotation::Polyline2d { header, .. }
            | Annotation::Segmentation3d { header, .. } => header,
        }
    }

    /// Target-schema object-data bucket this variant lands in.
    pub fn target_tag(&self) -> &'static str {
        match self {
            Annotation::BoundingBox2d { .. } => "bbox",
            Annotation::BoundingBox3d { .. } => "cuboid",
            Annotation::Polygon2d { .. } | Annotation::Polyline2d { .. } => "poly2d",
            Annotation::Segmentation3d { .. } => "vec",
        }
    }

    /// Project into the target per-geometry representation.
    pub fn to_target(&self) -> TranslateResult<AnnotationProjection> {
        let header = self.header();
        let (stream_id, stream_fragment) = header.sensor.to_target();

        let mut fragment = Map::new();
        fragment.insert("name".to_string(), json!(header.id.to_string()));

        match self {
            Annotation::BoundingBox2d { x_min, y_min, x_max, y_max, .. } => {
                fragment.insert(
                    "val".to_string(),
                    json!([
                        (x_min + x_max) / 2.0,
                        (y_min + y_max) / 2.0,
                        x_max - x_min,
                        y_max - y_min,
                    ]),
                );
            }
            Annotation::BoundingBox3d { center, size, quaternion, .. } => {
                fragment.insert(
                    "val".to_string(),
                    json!([
                        center.x, center.y, center.z,
                        quaternion.x, quaternion.y, quaternion.z, quaternion.w,
                        size.width, size.length, size.height,
                    ]),
                );
            }
            Annotation::Polygon2d { points, .. } => {
                fragment.insert("val".to_string(), flatten_points(points));
                fragment.insert("closed".to_string(), json!(true));
                fragment.insert("mode".to_string(), json!("MODE_POLY2D_ABSOLUTE"));
            }
            Annotation::Polyline2d { points, .. } => {
                fragment.insert("val".to_string(), flatten_points(points));
                fragment.insert("closed".to_string(), json!(false));
                fragment.insert("mode".to_string(), json!("MODE_POLY2D_ABSOLUTE"));
            }
            Annotation::Segmentation3d { associated_points, number_of_points, .. } => {
                fragment.insert("val".to_string(), json!(associated_points));
                fragment.insert("number_of_points".to_string(), json!(number_of_points));
            }
        }

        fragment.insert("coordinate_system".to_string(), json!(stream_id));
        if !header.attributes.is_empty() {
            let buckets = bucket_attributes(
                &header.attributes,
                &format!("annotations.{}.attributes", header.id),
            )?;
            fragment.insert("attributes".to_string(), buckets);
        }

        Ok(AnnotationProjection {
            fragment: Value::Object(fragment),
            object_id: header.object_id,
            class_name: header.class_name.clone(),
            stream_id,
            stream_fragment,
        })
    }
}

fn parse_points(geometry: &Map<String, Value>, path: &str) -> TranslateResult<Vec<(f64, f64)>> {
    let points_path = format!("{}.points", path);
    let array = tree::as_array(tree::get(geometry, "points", path)?, &points_path)?;

    let mut points = Vec::with_capacity(array.len());
    for (i, item) in array.iter().enumerate() {
        let point_path = format!("{}[{}]", points_path, i);
        let pair = tree::as_array(item, &point_path)?;
        if pair.len() != 2 {
            return Err(TranslateError::TypeMismatch {
                path: point_path,
                expected: "sequence of 2 numbers",
                got: format!("sequence of {} values", pair.len()),
            });
        }
        let x = pair[0].as_f64().ok_or_else(|| TranslateError::TypeMismatch {
            path: format!("{}[0]", point_path),
            expected: "number",
            got: tree::kind_name(&pair[0]).to_string(),
        })?;
        let y = pair[1].as_f64().ok_or_else(|| TranslateError::TypeMismatch {
            path: format!("{}[1]", point_path),
            expected: "number",
            got: tree::kind_name(&pair[1]).to_string(),
        })?;
        points.push((x, y));
    }
    Ok(points)
}

fn parse_point_indices(geometry: &Map<String, Value>, path: &str) -> TranslateResult<Vec<u64>> {
    let points_path = format!("{}.associatedPoints", path);
    let array = tree::as_array(tree::get(geometry, "associatedPoints", path)?, &points_path)?;

    let mut indices = Vec::with_capacity(array.len());
    for (i, item) in array.iter().enumerate() {
        indices.push(item.as_u64().ok_or_else(|| TranslateError::TypeMismatch {
            path: format!("{}[{}]", points_path, i),
            expected: "non-negative integer",
            got: tree::kind_name(item).to_string(),
        })?);
    }
    Ok(indices)
}

fn flatten_points(points: &[(f64, f64)]) -> Value {
    let mut flat = Vec::with_capacity(points.len() * 2);
    for (x, y) in points {
        flat.push(json!(x));
        flat.push(json!(y));
    }
    Value::Array(flat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sensor() -> Value {
        json!({
            "type": "camera_left",
            "uri": "camera_left/000.png",
            "timestamp": "1631674555.062343000",
        })
    }

    fn bbox2d_tree() -> Value {
        json!({
            "id": "78f0ad89-7a9d-4eb6-b79a-d29cd33a7f8c",
            "objectId": "48c2a7a7-c088-4fa7-8042-6b4f936c2094",
            "className": "person",
            "geometry": {"xMin": 10.0, "yMin": 20.0, "xMax": 30.0, "yMax": 50.0},
            "attributes": {"occluded": false},
            "sensor": sensor(),
        })
    }

    #[test]
    fn test_bbox2d_projection_val() {
        let annotation =
            Annotation::from_tree(AnnotationKind::BoundingBox2d, &bbox2d_tree(), "a").unwrap();
        let projection = annotation.to_target().unwrap();
        assert_eq!(projection.fragment["val"], json!([20.0, 35.0, 20.0, 30.0]));
        assert_eq!(projection.fragment["coordinate_system"], json!("camera_left"));
        assert_eq!(
            projection.fragment["name"],
            json!("78f0ad89-7a9d-4eb6-b79a-d29cd33a7f8c")
        );
        assert_eq!(annotation.target_tag(), "bbox");
    }

    #[test]
    fn test_bbox3d_val_order_is_center_quaternion_size() {
        let tree = json!({
            "id": "2f2a1706-a7a0-4c1e-92c9-bc1b0f9ec5f8",
            "objectId": "48c2a7a7-c088-4fa7-8042-6b4f936c2094",
            "className": "wagon",
            "geometry": {
                "center": {"x": 1.0, "y": 2.0, "z": 3.0},
                "size": {"width": 4.0, "length": 5.0, "height": 6.0},
                "quaternion": {"x": 0.1, "y": 0.2, "z": 0.3, "w": 0.9},
            },
            "attributes": {},
            "sensor": {"type": "lidar_merged", "uri": "lidar/000.pcd", "timestamp": "1.0"},
        });
        let annotation =
            Annotation::from_tree(AnnotationKind::BoundingBox3d, &tree, "a").unwrap();
        let projection = annotation.to_target().unwrap();
        assert_eq!(
            projection.fragment["val"],
            json!([1.0, 2.0, 3.0, 0.1, 0.2, 0.3, 0.9, 4.0, 5.0, 6.0])
        );
        assert_eq!(annotation.target_tag(), "cuboid");
        // empty attributes map emits no attributes key
        assert!(projection.fragment.get("attributes").is_none());
    }

    #[test]
    fn test_polygon_closes_and_polyline_does_not() {
        let mut tree = json!({
            "id": "3ddd65f8-9d4a-4775-b528-fc09b7f1f86f",
            "objectId": "58e7edd8-a7ee-4a8f-ab45-a04724cc6565",
            "className": "rail",
            "geometry": {"points": [[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]},
            "attributes": {},
            "sensor": sensor(),
        });

        let polygon = Annotation::from_tree(AnnotationKind::Polygon2d, &tree, "a").unwrap();
        let fragment = polygon.to_target().unwrap().fragment;
        assert_eq!(fragment["val"], json!([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
        assert_eq!(fragment["closed"], json!(true));
        assert_eq!(fragment["mode"], json!("MODE_POLY2D_ABSOLUTE"));

        tree["id"] = json!("57550878-a7ce-4a8f-ab45-a04724cc6565");
        let polyline = Annotation::from_tree(AnnotationKind::Polyline2d, &tree, "a").unwrap();
        let fragment = polyline.to_target().unwrap().fragment;
        assert_eq!(fragment["closed"], json!(false));
        assert_eq!(polyline.target_tag(), "poly2d");
    }

    #[test]
    fn test_segmentation_passthrough() {
        let tree = json!({
            "id": "a0f1ab60-6f7d-4458-bc11-7a7a5a26acf7",
            "objectId": "48c2a7a7-c088-4fa7-8042-6b4f936c2094",
            "className": "person",
            "geometry": {"associatedPoints": [10, 11, 12], "numberOfPointsInBox": 3},
            "attributes": {},
            "sensor": {"type": "lidar_merged", "uri": "lidar/000.pcd", "timestamp": "1.0"},
        });
        let annotation =
            Annotation::from_tree(AnnotationKind::Segmentation3d, &tree, "a").unwrap();
        let fragment = annotation.to_target().unwrap().fragment;
        assert_eq!(fragment["val"], json!([10, 11, 12]));
        assert_eq!(fragment["number_of_points"], json!(3));
        assert_eq!(annotation.target_tag(), "vec");
    }

    #[test]
    fn test_point_count_mismatch_is_not_rejected() {
        let tree = json!({
            "id": "a0f1ab60-6f7d-4458-bc11-7a7a5a26acf7",
            "objectId": "48c2a7a7-c088-4fa7-8042-6b4f936c2094",
            "className": "person",
            "geometry": {"associatedPoints": [10, 11], "numberOfPointsInBox": 99},
            "attributes": {},
            "sensor": {"type": "lidar_merged", "uri": "lidar/000.pcd", "timestamp": "1.0"},
        });
        let annotation =
            Annotation::from_tree(AnnotationKind::Segmentation3d, &tree, "a").unwrap();
        let fragment = annotation.to_target().unwrap().fragment;
        assert_eq!(fragment["number_of_points"], json!(99));
    }

    #[test]
    fn test_malformed_point_reports_breadcrumb() {
        let tree = json!({
            "id": "3ddd65f8-9d4a-4775-b528-fc09b7f1f86f",
            "objectId": "58e7edd8-a7ee-4a8f-ab45-a04724cc6565",
            "className": "rail",
            "geometry": {"points": [[1.0, 2.0], [3.0, 4.0], [5.0]]},
            "attributes": {},
            "sensor": sensor(),
        });
        let err = Annotation::from_tree(
            AnnotationKind::Polygon2d,
            &tree,
            "frames[3].annotations.2D_POLYGON[0]",
        )
        .unwrap_err();
        assert!(err
            .to_string()
            .contains("frames[3].annotations.2D_POLYGON[0].geometry.points[2]"));
    }

    #[test]
    fn test_invalid_object_uuid() {
        let mut tree = bbox2d_tree();
        tree["objectId"] = json!("zzz");
        let err = Annotation::from_tree(AnnotationKind::BoundingBox2d, &tree, "a").unwrap_err();
        assert!(matches!(err, TranslateError::InvalidUuid { .. }));
    }
}
