//! Bounding-box normalization adapter
//!
//! Inference engines report faces in different shapes. Every backend funnels
//! its native output through [`normalize_face`] so the rest of the pipeline
//! only ever sees [`FaceDetection`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detection::{DetectionResult, FaceDetection, FaceLandmarks, Point};
use crate::{DetectorError, Frame};

/// Native bounding-box shapes produced by supported engines
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RawBox {
    /// Top-left corner and size, absolute pixels
    CornerSize {
        top_left: [f32; 2],
        size: [f32; 2],
    },
    /// Origin coordinates and size, absolute pixels
    OriginSize {
        origin_x: f32,
        origin_y: f32,
        width: f32,
        height: f32,
    },
    /// Min/max extents relative to the frame (0-1). Landmarks reported with
    /// this shape are normalized too.
    NormalizedMinMax {
        x_min: f32,
        y_min: f32,
        x_max: f32,
        y_max: f32,
    },
}

/// Face as reported by an engine before normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFace {
    pub bbox: RawBox,
    pub score: f32,
    pub landmarks: Option<FaceLandmarks>,
}

/// Convert one engine face to the canonical shape
pub fn normalize_face(
    raw: &RawFace,
    frame_width: u32,
    frame_height: u32,
) -> Result<FaceDetection, DetectorError> {
    let (fw, fh) = (frame_width as f32, frame_height as f32);

    let (x, y, width, height) = match raw.bbox {
        RawBox::CornerSize { top_left, size } => (top_left[0], top_left[1], size[0], size[1]),
        RawBox::OriginSize {
            origin_x,
            origin_y,
            width,
            height,
        } => (origin_x, origin_y, width, height),
        RawBox::NormalizedMinMax {
            x_min,
            y_min,
            x_max,
            y_max,
        } => (x_min * fw, y_min * fh, (x_max - x_min) * fw, (y_max - y_min) * fh),
    };

    if ![x, y, width, height, raw.score].iter().all(|v| v.is_finite()) {
        return Err(DetectorError::Malformed("non-finite bounding box".into()));
    }
    if width <= 0.0 || height <= 0.0 {
        return Err(DetectorError::Malformed(format!(
            "empty bounding box {}x{}",
            width, height
        )));
    }

    let landmarks = match (&raw.landmarks, raw.bbox) {
        (Some(lm), RawBox::NormalizedMinMax { .. }) => {
            Some(lm.map_points(|p| Point::new(p.x * fw, p.y * fh)))
        }
        (lm, _) => lm.clone(),
    };

    Ok(FaceDetection {
        x,
        y,
        width,
        height,
        score: raw.score.clamp(0.0, 1.0),
        landmarks,
    })
}

/// Normalize every engine face, dropping malformed ones and those under
/// `min_confidence`
pub fn normalize_faces(raw: &[RawFace], frame: &Frame, min_confidence: f32) -> DetectionResult {
    let faces = raw
        .iter()
        .filter_map(|r| match normalize_face(r, frame.width, frame.height) {
            Ok(face) => Some(face),
            Err(e) => {
                debug!("Skipping face: {}", e);
                None
            }
        })
        .filter(|f| f.score >= min_confidence)
        .collect();
    DetectionResult::from_faces(faces)
}
