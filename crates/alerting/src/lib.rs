//! Alerting System
//!
//! Turns the per-tick compliance stream into signals a UI can show:
//! severity mapping, violation emission with optional cooldown, a delayed
//! status for flicker-free display, and debounced resolution events.

mod manager;
mod stabilizer;
mod status;
mod violation;

pub use manager::{ViolationManager, ViolationState};
pub use stabilizer::{StabilizerConfig, StabilizerEvent, StabilizerOutputs, ViolationStabilizer};
pub use status::DetectionStatus;
pub use violation::{is_critical_category, Severity, ViolationRecord};
