//! Session monitoring settings

use serde::{Deserialize, Serialize};

/// Detection settings chosen at session start.
///
/// Sensitivities are 0-100 and are clamped when converted to confidence
/// thresholds; non-finite values fall back to the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringSettings {
    pub enable_face_detection: bool,
    pub face_detection_sensitivity: f32,
    pub enable_object_detection: bool,
    pub object_detection_sensitivity: f32,
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        Self {
            enable_face_detection: true,
            face_detection_sensitivity: 50.0,
            enable_object_detection: true,
            object_detection_sensitivity: 50.0,
        }
    }
}

impl MonitoringSettings {
    /// Minimum face confidence (0-1)
    pub fn face_min_confidence(&self) -> f32 {
        sensitivity_to_confidence(self.face_detection_sensitivity)
    }

    /// Minimum object confidence (0-1)
    pub fn object_min_confidence(&self) -> f32 {
        sensitivity_to_confidence(self.object_detection_sensitivity)
    }
}

fn sensitivity_to_confidence(sensitivity: f32) -> f32 {
    let sensitivity = if sensitivity.is_finite() { sensitivity } else { 50.0 };
    sensitivity.clamp(0.0, 100.0) / 100.0
}
