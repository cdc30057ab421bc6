//! Canonical detection shapes shared by every backend

use serde::{Deserialize, Serialize};
use tracing::warn;

/// 2D point in frame-pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Named facial landmarks for one face.
///
/// Eye contours are 6 points each: outer corner, two upper-lid points,
/// inner corner, two lower-lid points. `right_eye` is the eye with the
/// larger x in the image. The jaw outline is 17 points from the image-left
/// edge of the face to the image-right edge; point 8 is the chin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    pub left_eye: Vec<Point>,
    pub right_eye: Vec<Point>,
    pub nose_tip: Point,
    pub jaw: Vec<Point>,
}

impl FaceLandmarks {
    /// Points per eye contour
    pub const EYE_POINTS: usize = 6;
    /// Points in the jaw outline
    pub const JAW_POINTS: usize = 17;
    /// Index of the chin in the jaw outline
    pub const CHIN: usize = 8;

    /// Apply `f` to every point
    pub fn map_points(&self, f: impl Fn(Point) -> Point) -> Self {
        Self {
            left_eye: self.left_eye.iter().copied().map(&f).collect(),
            right_eye: self.right_eye.iter().copied().map(&f).collect(),
            nose_tip: f(self.nose_tip),
            jaw: self.jaw.iter().copied().map(&f).collect(),
        }
    }
}

/// Face bounding box in canonical form (top-left corner + size, pixels)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceDetection {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Detection score (0-1)
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<FaceLandmarks>,
}

impl FaceDetection {
    fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.score.is_finite()
    }
}

/// Face detection output for one frame.
///
/// Construct through [`DetectionResult::from_faces`] so that `face_count`
/// and `has_face` always agree with `faces`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub has_face: bool,
    pub face_count: usize,
    pub faces: Vec<FaceDetection>,
    /// Score of the best face (0-1), 0 when no face
    pub primary_confidence: f32,
}

impl DetectionResult {
    /// No faces
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a result from detected faces, deriving the summary fields
    pub fn from_faces(faces: Vec<FaceDetection>) -> Self {
        let primary_confidence = faces
            .iter()
            .map(|f| f.score)
            .fold(0.0_f32, f32::max)
            .clamp(0.0, 1.0);
        Self {
            has_face: !faces.is_empty(),
            face_count: faces.len(),
            faces,
            primary_confidence,
        }
    }

    /// Re-establish the invariants on output from an untrusted backend.
    ///
    /// Faces with non-finite geometry are dropped and scores are clamped to
    /// `[0, 1]` before the summary fields are recomputed.
    pub fn sanitized(self) -> Self {
        let before = self.faces.len();
        let faces: Vec<FaceDetection> = self
            .faces
            .into_iter()
            .filter(FaceDetection::is_finite)
            .map(|mut f| {
                f.score = f.score.clamp(0.0, 1.0);
                f
            })
            .collect();
        if faces.len() != before {
            warn!("Dropped {} malformed face detection(s)", before - faces.len());
        }
        Self::from_faces(faces)
    }
}

/// Detected object label with score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDetection {
    pub label: String,
    pub score: f32,
}

impl ObjectDetection {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Per-call detection options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectOptions {
    /// Minimum confidence (0-1) for a detection to be reported
    pub min_confidence: f32,
}

impl DetectOptions {
    pub fn with_min_confidence(min_confidence: f32) -> Self {
        Self { min_confidence }
    }
}
