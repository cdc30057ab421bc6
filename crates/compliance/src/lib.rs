//! Compliance Orchestration
//!
//! Decides once per tick whether the test-taker is compliant:
//! - Face presence and multiplicity (fail closed on detector outage)
//! - Gaze, head pose, attention, and looking-away analysis
//! - Prohibited-object categorisation (fail open on detector outage)
//! - Primary/fallback detector backends with a one-way switch

pub mod objects;
pub mod orchestrator;
pub mod result;
pub mod settings;
pub mod warning;

pub use objects::{categorize_label, categorize_objects, ObjectCategory};
pub use orchestrator::{ActiveBackend, BackendPair, ComplianceOrchestrator};
pub use result::ComplianceResult;
pub use settings::MonitoringSettings;
pub use warning::ComplianceWarning;

use detector_backend::DetectorError;
use thiserror::Error;

/// Compliance error types
#[derive(Error, Debug)]
pub enum ComplianceError {
    #[error("Backend {backend} failed: {source}")]
    Backend {
        backend: String,
        #[source]
        source: DetectorError,
    },

    #[error("Backend {backend} timed out after {timeout_ms}ms")]
    Timeout { backend: String, timeout_ms: u64 },
}
