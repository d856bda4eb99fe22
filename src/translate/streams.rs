/*!
Sensor classification into target-schema stream types.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

/// Target-schema stream type of a sensor channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamType {
    Camera,
    Lidar,
    Radar,
    Other,
}

impl StreamType {
    /// Classify a UAI sensor identifier.
    ///
    /// Substring rules applied in order, case-insensitively: "camera",
    /// "lidar", "radar"; anything else falls back to `Other`.
    pub fn classify(sensor_id: &str) -> Self {
        let lowered = sensor_id.to_lowercase();
        if lowered.contains("camera") {
            StreamType::Camera
        } else if lowered.contains("lidar") {
            StreamType::Lidar
        } else if lowered.contains("radar") {
            StreamType::Radar
        } else {
            StreamType::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamType::Camera => "camera",
            StreamType::Lidar => "lidar",
            StreamType::Radar => "radar",
            StreamType::Other => "other",
        }
    }
}
