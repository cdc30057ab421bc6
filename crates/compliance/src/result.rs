//! Aggregate per-tick result

use behavior::{GazeDirection, HeadPose};
use serde::{Deserialize, Serialize};

use crate::objects::ObjectCategory;
use crate::warning::ComplianceWarning;

/// Everything one tick concluded about the test-taker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub face_detected: bool,
    pub face_count: usize,
    /// Best face confidence (0-100)
    pub face_confidence: f32,
    pub objects_detected: Vec<ObjectCategory>,
    pub warnings: Vec<ComplianceWarning>,
    pub gaze_direction: GazeDirection,
    pub head_pose: HeadPose,
    pub looking_away: bool,
    /// Ongoing away-episode (seconds)
    pub looking_away_duration: f32,
    /// Attention (0-100)
    pub attention_score: f32,
}

impl Default for ComplianceResult {
    fn default() -> Self {
        Self::neutral()
    }
}

impl ComplianceResult {
    /// Result reported when nothing was evaluated
    pub fn neutral() -> Self {
        Self {
            face_detected: false,
            face_count: 0,
            face_confidence: 0.0,
            objects_detected: Vec::new(),
            warnings: Vec::new(),
            gaze_direction: GazeDirection::Center,
            head_pose: HeadPose::default(),
            looking_away: false,
            looking_away_duration: 0.0,
            attention_score: 100.0,
        }
    }

    /// Check if any warnings are active
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Warning messages for display
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    /// Append a warning unless already present
    pub(crate) fn warn(&mut self, warning: ComplianceWarning) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }
}
