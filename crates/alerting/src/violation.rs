//! Violation records and severity mapping

use chrono::{DateTime, Utc};
use compliance::{ComplianceWarning, ObjectCategory};
use serde::{Deserialize, Serialize};

/// Violation severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Severity of a warning: prohibited devices and phones are critical,
    /// absence and multiplicity are high, everything else medium
    pub fn of(warning: &ComplianceWarning) -> Self {
        match warning {
            ComplianceWarning::Object(ObjectCategory::MobilePhone)
            | ComplianceWarning::Object(ObjectCategory::UnauthorizedDevice)
            | ComplianceWarning::Object(ObjectCategory::UnauthorizedMaterial) => Severity::Critical,
            ComplianceWarning::NoFace | ComplianceWarning::MultipleFaces => Severity::High,
            _ => Severity::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Warning categories whose disappearance counts as a resolution
pub fn is_critical_category(warning: &ComplianceWarning) -> bool {
    matches!(
        warning,
        ComplianceWarning::NoFace
            | ComplianceWarning::MultipleFaces
            | ComplianceWarning::Object(ObjectCategory::MobilePhone)
            | ComplianceWarning::Object(ObjectCategory::UnauthorizedMaterial)
    )
}

/// Violation delivered to the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationRecord {
    #[serde(rename = "type")]
    pub violation_type: String,
    pub severity: Severity,
    pub message: String,
    pub observed_at: DateTime<Utc>,
}

impl ViolationRecord {
    pub fn from_warning(warning: &ComplianceWarning) -> Self {
        Self {
            violation_type: warning.code().to_string(),
            severity: Severity::of(warning),
            message: warning.to_string(),
            observed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use behavior::SuspiciousFlag;

    #[test]
    fn test_severity_levels() {
        let phone = ComplianceWarning::Object(ObjectCategory::MobilePhone);
        let device = ComplianceWarning::Object(ObjectCategory::UnauthorizedDevice);
        let item = ComplianceWarning::Object(ObjectCategory::ProhibitedItem);

        assert_eq!(Severity::of(&phone), Severity::Critical);
        assert_eq!(Severity::of(&device), Severity::Critical);
        assert_eq!(Severity::of(&ComplianceWarning::NoFace), Severity::High);
        assert_eq!(Severity::of(&ComplianceWarning::MultipleFaces), Severity::High);
        assert_eq!(Severity::of(&item), Severity::Medium);
        assert_eq!(Severity::of(&ComplianceWarning::GazeNotCentered), Severity::Medium);
        assert_eq!(
            Severity::of(&ComplianceWarning::Suspicious(SuspiciousFlag::FrequentLookingAway)),
            Severity::Medium
        );
    }

    #[test]
    fn test_critical_categories() {
        assert!(is_critical_category(&ComplianceWarning::NoFace));
        let material = ComplianceWarning::Object(ObjectCategory::UnauthorizedMaterial);
        let device = ComplianceWarning::Object(ObjectCategory::UnauthorizedDevice);
        assert!(is_critical_category(&material));
        assert!(!is_critical_category(&device));
        assert!(!is_critical_category(&ComplianceWarning::LowAttention));
    }

    #[test]
    fn test_record_from_warning() {
        let record = ViolationRecord::from_warning(&ComplianceWarning::MultipleFaces);
        assert_eq!(record.violation_type, "multiple_faces");
        assert_eq!(record.severity, Severity::High);
        assert_eq!(record.message, "Multiple faces detected");
    }
}
