//! Compliance warnings raised by a tick

use std::fmt;

use behavior::SuspiciousFlag;
use serde::{Deserialize, Serialize};

use crate::objects::ObjectCategory;

/// A rule violation observed in one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceWarning {
    NoFace,
    MultipleFaces,
    LowFaceConfidence,
    /// Ongoing away-episode, whole seconds
    ExtendedLookingAway { seconds: u64 },
    GazeNotCentered,
    LowAttention,
    HeadTurned,
    Suspicious(SuspiciousFlag),
    Object(ObjectCategory),
    SystemError,
}

impl ComplianceWarning {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ComplianceWarning::NoFace => "no_face",
            ComplianceWarning::MultipleFaces => "multiple_faces",
            ComplianceWarning::LowFaceConfidence => "low_face_confidence",
            ComplianceWarning::ExtendedLookingAway { .. } => "extended_looking_away",
            ComplianceWarning::GazeNotCentered => "gaze_not_centered",
            ComplianceWarning::LowAttention => "low_attention",
            ComplianceWarning::HeadTurned => "head_turned",
            ComplianceWarning::Suspicious(flag) => match flag {
                SuspiciousFlag::FrequentLookingAway => "frequent_looking_away",
                SuspiciousFlag::ExtendedInattention => "extended_inattention",
                SuspiciousFlag::DecliningAttention => "declining_attention",
            },
            ComplianceWarning::Object(category) => match category {
                ObjectCategory::MobilePhone => "mobile_phone",
                ObjectCategory::UnauthorizedDevice => "unauthorized_device",
                ObjectCategory::UnauthorizedMaterial => "unauthorized_material",
                ObjectCategory::ProhibitedItem => "prohibited_item",
            },
            ComplianceWarning::SystemError => "system_error",
        }
    }
}

impl fmt::Display for ComplianceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplianceWarning::NoFace => f.write_str("No face detected in camera feed"),
            ComplianceWarning::MultipleFaces => f.write_str("Multiple faces detected"),
            ComplianceWarning::LowFaceConfidence => f.write_str("Face detection confidence is low"),
            ComplianceWarning::ExtendedLookingAway { seconds } => {
                write!(f, "Extended looking away detected ({}s)", seconds)
            }
            ComplianceWarning::GazeNotCentered => f.write_str("Gaze not centered"),
            ComplianceWarning::LowAttention => f.write_str("Low attention score"),
            ComplianceWarning::HeadTurned => f.write_str("Head turned significantly to the side"),
            ComplianceWarning::Suspicious(flag) => write!(f, "{}", flag),
            ComplianceWarning::Object(ObjectCategory::MobilePhone) => {
                f.write_str("Mobile phone detected")
            }
            ComplianceWarning::Object(ObjectCategory::UnauthorizedDevice) => {
                f.write_str("Unauthorized electronic device detected")
            }
            ComplianceWarning::Object(ObjectCategory::UnauthorizedMaterial) => {
                f.write_str("Unauthorized material detected")
            }
            ComplianceWarning::Object(ObjectCategory::ProhibitedItem) => {
                f.write_str("Prohibited item detected")
            }
            ComplianceWarning::SystemError => f.write_str("System error during monitoring"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ComplianceWarning::ExtendedLookingAway { seconds: 4 }.to_string(),
            "Extended looking away detected (4s)"
        );
        assert_eq!(
            ComplianceWarning::Suspicious(SuspiciousFlag::DecliningAttention).to_string(),
            "Declining attention trend detected"
        );
        assert_eq!(ComplianceWarning::NoFace.code(), "no_face");
    }
}
