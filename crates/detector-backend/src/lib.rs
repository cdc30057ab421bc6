//! Detector Backend Boundary
//!
//! Everything the proctoring pipeline knows about ML inference lives here:
//! - Captured frames handed to a backend
//! - Canonical face and object detections
//! - Normalization of backend-specific bounding-box shapes
//! - A scripted backend for tests and simulations

pub mod detection;
pub mod frame;
pub mod normalize;
pub mod scripted;

pub use detection::{
    DetectOptions, DetectionResult, FaceDetection, FaceLandmarks, ObjectDetection, Point,
};
pub use frame::Frame;
pub use normalize::{normalize_face, normalize_faces, RawBox, RawFace};
pub use scripted::{ScriptedBackend, ScriptedResponse, SyntheticFace};

use async_trait::async_trait;
use thiserror::Error;

/// Detector backend error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Malformed detection: {0}")]
    Malformed(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
}

/// Pluggable face/object detection backend.
///
/// Implementations wrap a concrete inference engine and must report results
/// in the canonical shapes of [`detection`], using [`normalize`] when their
/// native box format differs.
#[async_trait]
pub trait DetectorBackend: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &str;

    /// Detect faces with at least `options.min_confidence`
    async fn detect_faces(
        &self,
        frame: &Frame,
        options: DetectOptions,
    ) -> Result<DetectionResult, DetectorError>;

    /// Detect objects with at least `options.min_confidence`
    async fn detect_objects(
        &self,
        frame: &Frame,
        options: DetectOptions,
    ) -> Result<Vec<ObjectDetection>, DetectorError>;
}
