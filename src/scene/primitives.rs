/*!
Primitive value objects of the UAI scene model.

Each primitive parses itself out of a tagged subtree (`from_tree`) and, where
the target schema has a counterpart, projects itself into a RailLabel/OpenLabel
fragment (`to_target`). Projections are pure functions of the value.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use serde_json::{json, Map, Value};

use crate::translate::streams::StreamType;
use crate::tree;
use crate::types::{TranslateError, TranslateResult};

/// A point in 3D space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3d {
    pub fn from_tree(value: &Value, path: &str) -> TranslateResult<Self> {
        let obj = tree::as_object(value, path)?;
        Ok(Self {
            x: tree::get_f64(obj, "x", path)?,
            y: tree::get_f64(obj, "y", path)?,
            z: tree::get_f64(obj, "z", path)?,
        })
    }
}

/// Extent of a 3D box. UAI field order (width, length, height) is preserved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size3d {
    pub width: f64,
    pub length: f64,
    pub height: f64,
}

impl Size3d {
    pub fn from_tree(value: &Value, path: &str) -> TranslateResult<Self> {
        let obj = tree::as_object(value, path)?;
        Ok(Self {
            width: tree::get_f64(obj, "width", path)?,
            length: tree::get_f64(obj, "length", path)?,
            height: tree::get_f64(obj, "height", path)?,
        })
    }
}

/// A rotation quaternion in (x, y, z, w) order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub fn from_tree(value: &Value, path: &str) -> TranslateResult<Self> {
        let obj = tree::as_object(value, path)?;
        Ok(Self {
            x: tree::get_f64(obj, "x", path)?,
            y: tree::get_f64(obj, "y", path)?,
            z: tree::get_f64(obj, "z", path)?,
            w: tree::get_f64(obj, "w", path)?,
        })
    }

    /// Expand to a 3x3 rotation matrix, row major.
    ///
    /// Standard unit-quaternion expansion; the input is taken as-is and not
    /// normalized (normalization checks are outside the converter's scope).
    pub fn rotation_matrix(&self) -> [f64; 9] {
        let Self { x, y, z, w } = *self;
        [
            1.0 - 2.0 * (y * y + z * z),
            2.0 * (x * y - z * w),
            2.0 * (x * z + y * w),
            2.0 * (x * y + z * w),
            1.0 - 2.0 * (x * x + z * z),
            2.0 * (y * z - x * w),
            2.0 * (x * z - y * w),
            2.0 * (y * z + x * w),
            1.0 - 2.0 * (x * x + y * y),
        ]
    }
}

/// Reference from an annotation to the sensor that produced its data.
///
/// `sensor_type` doubles as the target-schema stream id.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReference {
    pub sensor_type: String,
    pub uri: String,
    /// Decimal timestamp kept as literal source text.
    pub timestamp: String,
}

impl SensorReference {
    pub fn from_tree(value: &Value, path: &str) -> TranslateResult<Self> {
        let obj = tree::as_object(value, path)?;
        Ok(Self {
            sensor_type: tree::get_str(obj, "type", path)?,
            uri: tree::get_str(obj, "uri", path)?,
            timestamp: tree::get_decimal_text(obj, "timestamp", path)?,
        })
    }

    /// Emit the per-frame stream sync fragment, keyed by stream id.
    pub fn to_target(&self) -> (String, Value) {
        let fragment = json!({
            "stream_properties": {
                "sync": {
                    "timestamp": self.timestamp,
                }
            },
            "uri": self.uri,
        });
        (self.sensor_type.clone(), fragment)
    }
}

/// A calibrated UAI coordinate system (one per sensor).
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSystem {
    pub uid: String,
    pub topic: String,
    pub frame_id: String,
    pub position: Vec<f64>,
    pub rotation_quaternion: Vec<f64>,
    pub rotation_matrix: Vec<f64>,
    pub angle_axis_rotation: Vec<f64>,
    pub homogeneous_transform: Option<Vec<f64>>,
    pub measured_position: Option<Vec<f64>>,
    // Camera-only calibration; absent for non-camera sensors.
    pub camera_matrix: Option<Vec<f64>>,
    pub dist_coeffs: Option<Vec<f64>>,
}

impl CoordinateSystem {
    pub fn from_tree(value: &Value, path: &str) -> TranslateResult<Self> {
        let obj = tree::as_object(value, path)?;
        Ok(Self {
            uid: tree::get_str(obj, "coordinate_system_id", path)?,
            topic: tree::get_str(obj, "topic", path)?,
            frame_id: tree::get_str(obj, "frame_id", path)?,
            position: tree::get_f64_array(obj, "position", path)?,
            rotation_quaternion: tree::get_f64_array(obj, "rotation_quaternion", path)?,
            rotation_matrix: tree::get_f64_array(obj, "rotation_matrix", path)?,
            angle_axis_rotation: tree::get_f64_array(obj, "angle_axis_rotation", path)?,
            homogeneous_transform: tree::opt_f64_array(obj, "homogeneous_transform", path)?,
            measured_position: tree::opt_f64_array(obj, "measured_position", path)?,
            camera_matrix: tree::opt_f64_array(obj, "camera_matrix", path)?,
            dist_coeffs: tree::opt_f64_array(obj, "dist_coeffs", path)?,
        })
    }

    /// Emit the coordinate_system and stream fragments for this system.
    ///
    /// The pose is taken from `homogeneous_transform` when present, otherwise
    /// composed from `position` and `rotation_quaternion`.
    pub fn to_target(&self, reference_frame: &str) -> TranslateResult<(Value, Value)> {
        let matrix = self.pose_matrix()?;
        let coordinate_system = json!({
            "type": "sensor",
            "parent_frame": reference_frame,
            "children": [],
            "pose_wrt_parent": {
                "matrix4x4": matrix,
            },
        });

        let stream_type = StreamType::classify(&self.uid);
        let mut stream = Map::new();
        stream.insert("type".to_string(), json!(stream_type.as_str()));
        if stream_type == StreamType::Camera {
            if let Some(camera_matrix) = &self.camera_matrix {
                let dist_coeffs = self.dist_coeffs.clone().unwrap_or_default();
                stream.insert(
                    "stream_properties".to_string(),
                    json!({
                        "intrinsics_pinhole": {
                            "camera_matrix": camera_matrix,
                            "distortion_coefficients": dist_coeffs,
                        }
                    }),
                );
            }
        }

        Ok((coordinate_system, Value::Object(stream)))
    }

    /// Row-major 4x4 pose matrix of this system wrt the reference frame.
    fn pose_matrix(&self) -> TranslateResult<[f64; 16]> {
        if let Some(transform) = &self.homogeneous_transform {
            if transform.len() != 16 {
                return Err(TranslateError::TypeMismatch {
                    path: format!("coordinateSystems.{}.homogeneous_transform", self.uid),
                    expected: "sequence of 16 numbers",
                    got: format!("sequence of {} numbers", transform.len()),
                });
            }
            let mut matrix = [0.0; 16];
            matrix.copy_from_slice(transform);
            return Ok(matrix);
        }

        if self.position.len() != 3 {
            return Err(TranslateError::TypeMismatch {
                path: format!("coordinateSystems.{}.position", self.uid),
                expected: "sequence of 3 numbers",
                got: format!("sequence of {} numbers", self.position.len()),
            });
        }
        if self.rotation_quaternion.len() != 4 {
            return Err(TranslateError::TypeMismatch {
                path: format!("coordinateSystems.{}.rotation_quaternion", self.uid),
                expected: "sequence of 4 numbers",
                got: format!("sequence of {} numbers", self.rotation_quaternion.len()),
            });
        }

        let rotation = Quaternion {
            x: self.rotation_quaternion[0],
            y: self.rotation_quaternion[1],
            z: self.rotation_quaternion[2],
            w: self.rotation_quaternion[3],
        }
        .rotation_matrix();

        let t = &self.position;
        Ok([
            rotation[0], rotation[1], rotation[2], t[0],
            rotation[3], rotation[4], rotation[5], t[1],
            rotation[6], rotation[7], rotation[8], t[2],
            0.0, 0.0, 0.0, 1.0,
        ])
    }
}

/// Scene-level UAI export metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub clip_id: String,
    pub external_clip_id: String,
    pub project_id: String,
    pub export_time: String,
    pub exporter_version: String,
    pub coordinate_system_3d: String,
    pub coordinate_system_reference: String,
    pub folder_name: String,
}

impl Metadata {
    pub fn from_tree(value: &Value, path: &str) -> TranslateResult<Self> {
        let obj = tree::as_object(value, path)?;
        Ok(Self {
            clip_id: tree::get_str(obj, "clip_id", path)?,
            external_clip_id: tree::get_str(obj, "external_clip_id", path)?,
            project_id: tree::get_str(obj, "project_id", path)?,
            export_time: tree::get_str(obj, "export_time", path)?,
            exporter_version: tree::get_str(obj, "exporter_version", path)?,
            coordinate_system_3d: tree::get_str(obj, "coordinate_system_3d", path)?,
            coordinate_system_reference: tree::get_str(obj, "coordinate_system_reference", path)?,
            folder_name: tree::get_str(obj, "folder_name", path)?,
        })
    }

    /// Emit the target metadata fragment.
    ///
    /// `subschema_version` is the target-schema constant supplied by the host
    /// (see [`crate::SUBSCHEMA_VERSION`]).
    pub fn to_target(&self, subschema_version: &str) -> Value {
        json!({
            "schema_version": "1.0.0",
            "subschema_version": subschema_version,
            "exporter_version": self.exporter_version,
            "name": self.clip_id,
            "tagged_file": self.folder_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_point_from_tree() {
        let p = Point3d::from_tree(&json!({"x": 1.0, "y": 2.0, "z": 3.0}), "center").unwrap();
        assert_eq!(p, Point3d { x: 1.0, y: 2.0, z: 3.0 });
    }

    #[test]
    fn test_point_missing_axis() {
        let err = Point3d::from_tree(&json!({"x": 1.0, "y": 2.0}), "geometry.center").unwrap_err();
        assert_eq!(err.to_string(), "missing required field: geometry.center.z");
    }

    #[test]
    fn test_sensor_reference_sync_fragment() {
        let sensor = SensorReference::from_tree(
            &json!({
                "type": "lidar_merged",
                "uri": "lidar_merged/000_1631674555.062343000.pcd",
                "timestamp": "1631674555.062343000",
            }),
            "sensor",
        )
        .unwrap();

        let (stream_id, fragment) = sensor.to_target();
        assert_eq!(stream_id, "lidar_merged");
        assert_eq!(
            fragment["stream_properties"]["sync"]["timestamp"],
            json!("1631674555.062343000")
        );
        assert_eq!(fragment["uri"], json!("lidar_merged/000_1631674555.062343000.pcd"));
    }

    #[test]
    fn test_identity_quaternion_pose() {
        let cs = CoordinateSystem {
            uid: "lidar_merged".to_string(),
            topic: "/lidar/points".to_string(),
            frame_id: "lidar".to_string(),
            position: vec![1.0, 2.0, 3.0],
            rotation_quaternion: vec![0.0, 0.0, 0.0, 1.0],
            rotation_matrix: vec![],
            angle_axis_rotation: vec![],
            homogeneous_transform: None,
            measured_position: None,
            camera_matrix: None,
            dist_coeffs: None,
        };

        let (fragment, stream) = cs.to_target("base").unwrap();
        assert_eq!(
            fragment["pose_wrt_parent"]["matrix4x4"],
            json!([
                1.0, 0.0, 0.0, 1.0,
                0.0, 1.0, 0.0, 2.0,
                0.0, 0.0, 1.0, 3.0,
                0.0, 0.0, 0.0, 1.0,
            ])
        );
        assert_eq!(fragment["parent_frame"], json!("base"));
        assert_eq!(stream["type"], json!("lidar"));
        assert!(stream.get("stream_properties").is_none());
    }

    #[test]
    fn test_homogeneous_transform_wins_over_quaternion() {
        let transform: Vec<f64> = (0..16).map(f64::from).collect();
        let cs = CoordinateSystem {
            uid: "radar_front".to_string(),
            topic: String::new(),
            frame_id: String::new(),
            position: vec![9.0, 9.0, 9.0],
            rotation_quaternion: vec![0.0, 0.0, 0.0, 1.0],
            rotation_matrix: vec![],
            angle_axis_rotation: vec![],
            homogeneous_transform: Some(transform.clone()),
            measured_position: None,
            camera_matrix: None,
            dist_coeffs: None,
        };

        let (fragment, _) = cs.to_target("base").unwrap();
        assert_eq!(fragment["pose_wrt_parent"]["matrix4x4"], json!(transform));
    }

    #[test]
    fn test_camera_stream_carries_intrinsics() {
        let cs = CoordinateSystem {
            uid: "camera_left".to_string(),
            topic: String::new(),
            frame_id: String::new(),
            position: vec![0.0, 0.0, 0.0],
            rotation_quaternion: vec![0.0, 0.0, 0.0, 1.0],
            rotation_matrix: vec![],
            angle_axis_rotation: vec![],
            homogeneous_transform: None,
            measured_position: None,
            camera_matrix: Some(vec![1000.0, 0.0, 960.0, 0.0, 1000.0, 600.0, 0.0, 0.0, 1.0]),
            dist_coeffs: Some(vec![-0.1, 0.01, 0.0, 0.0, 0.0]),
        };

        let (_, stream) = cs.to_target("base").unwrap();
        assert_eq!(stream["type"], json!("camera"));
        let intrinsics = &stream["stream_properties"]["intrinsics_pinhole"];
        assert_eq!(intrinsics["camera_matrix"].as_array().unwrap().len(), 9);
        assert_eq!(intrinsics["distortion_coefficients"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_metadata_projection() {
        let metadata = Metadata {
            clip_id: "db_3fe71f52".to_string(),
            external_clip_id: "2021-09-15-07-35-55".to_string(),
            project_id: "trains_4".to_string(),
            export_time: "2021-11-02 11:11".to_string(),
            exporter_version: "1.2.1".to_string(),
            coordinate_system_3d: "FRAME_LIDAR".to_string(),
            coordinate_system_reference: "ISO8855".to_string(),
            folder_name: "2021-09-15-07-35-55_A".to_string(),
        };

        let fragment = metadata.to_target("1.0.0");
        assert_eq!(fragment["schema_version"], json!("1.0.0"));
        assert_eq!(fragment["subschema_version"], json!("1.0.0"));
        assert_eq!(fragment["name"], json!("db_3fe71f52"));
        assert_eq!(fragment["tagged_file"], json!("2021-09-15-07-35-55_A"));
    }
}
