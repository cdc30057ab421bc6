//! Detection status shown next to the camera preview

use compliance::ComplianceResult;
use serde::{Deserialize, Serialize};

/// Face status as displayed by the UI
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionStatus {
    pub face_count: usize,
    /// Best face confidence (0-100)
    pub confidence: f32,
    pub is_detecting: bool,
}

impl DetectionStatus {
    pub fn from_result(result: &ComplianceResult) -> Self {
        Self {
            face_count: result.face_count,
            confidence: result.face_confidence,
            is_detecting: result.face_detected,
        }
    }
}
