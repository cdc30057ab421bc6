//! Gaze direction and head pose from facial landmarks

use detector_backend::{FaceLandmarks, Point};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{BehaviorConfig, BehaviorError};

/// Smallest eye separation / face height (pixels) treated as measurable
const MIN_SPAN: f32 = 1e-3;

/// Discrete gaze classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GazeDirection {
    #[default]
    Center,
    Left,
    Right,
    Up,
    Down,
    /// Landmarks unusable
    Away,
}

/// Normalized head pose
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeadPose {
    /// Left-right rotation (-1 to 1, positive = nose toward image right)
    pub yaw: f32,
    /// Up-down rotation (-1 to 1, positive = nose below its neutral position)
    pub pitch: f32,
    /// Tilt in degrees, unclamped
    pub roll: f32,
}

/// Landmark geometry extractor
#[derive(Debug, Clone)]
pub struct SignalExtractor {
    horizontal_threshold: f32,
    vertical_threshold: f32,
    vertical_offset: f32,
}

impl Default for SignalExtractor {
    fn default() -> Self {
        Self::new(&BehaviorConfig::default())
    }
}

impl SignalExtractor {
    pub fn new(config: &BehaviorConfig) -> Self {
        Self {
            horizontal_threshold: config.horizontal_gaze_threshold,
            vertical_threshold: config.vertical_gaze_threshold,
            vertical_offset: config.vertical_gaze_offset,
        }
    }

    /// Gaze and head pose for one face. Unusable landmarks yield a neutral
    /// pose with [`GazeDirection::Away`].
    pub fn extract(&self, landmarks: &FaceLandmarks) -> (GazeDirection, HeadPose) {
        match self.try_extract(landmarks) {
            Ok(signals) => signals,
            Err(e) => {
                debug!("Landmark geometry unusable: {}", e);
                (GazeDirection::Away, HeadPose::default())
            }
        }
    }

    fn try_extract(&self, lm: &FaceLandmarks) -> Result<(GazeDirection, HeadPose), BehaviorError> {
        let left = eye_center(&lm.left_eye)?;
        let right = eye_center(&lm.right_eye)?;
        if lm.jaw.len() != FaceLandmarks::JAW_POINTS {
            return Err(BehaviorError::KeypointsMissing("jaw"));
        }
        let nose = finite(lm.nose_tip, "nose tip")?;
        let jaw_left = finite(lm.jaw[0], "jaw")?;
        let jaw_right = finite(lm.jaw[FaceLandmarks::JAW_POINTS - 1], "jaw")?;
        let chin = finite(lm.jaw[FaceLandmarks::CHIN], "chin")?;

        let mid = Point::new((left.x + right.x) / 2.0, (left.y + right.y) / 2.0);
        let separation = (right.x - left.x).abs();
        if separation < MIN_SPAN {
            return Err(BehaviorError::Degenerate("eye separation"));
        }
        let face_height = (chin.y - mid.y).abs();
        if face_height < MIN_SPAN {
            return Err(BehaviorError::Degenerate("face height"));
        }

        let horizontal = (mid.x - nose.x) / separation;
        let vertical = (mid.y - nose.y) / separation - self.vertical_offset;
        let gaze = self.classify(horizontal, vertical);

        let yaw = ((nose.x - mid.x) / separation).clamp(-1.0, 1.0);
        let expected_nose_y = mid.y + 0.3 * face_height;
        let pitch = ((nose.y - expected_nose_y) / face_height).clamp(-1.0, 1.0);
        let roll = (angle_degrees(right, left) + angle_degrees(jaw_right, jaw_left)) / 2.0;

        Ok((gaze, HeadPose { yaw, pitch, roll }))
    }

    /// Horizontal deviation wins when both axes exceed their thresholds.
    fn classify(&self, horizontal: f32, vertical: f32) -> GazeDirection {
        if horizontal.abs() > self.horizontal_threshold {
            if horizontal > 0.0 {
                GazeDirection::Left
            } else {
                GazeDirection::Right
            }
        } else if vertical.abs() > self.vertical_threshold {
            if vertical > 0.0 {
                GazeDirection::Up
            } else {
                GazeDirection::Down
            }
        } else {
            GazeDirection::Center
        }
    }
}

/// Corner midpoint for x, eyelid midpoint for y
fn eye_center(contour: &[Point]) -> Result<Point, BehaviorError> {
    if contour.len() != FaceLandmarks::EYE_POINTS {
        return Err(BehaviorError::KeypointsMissing("eye contour"));
    }
    if !contour.iter().all(Point::is_finite) {
        return Err(BehaviorError::Degenerate("eye contour"));
    }
    let x = (contour[0].x + contour[3].x) / 2.0;
    let upper = (contour[1].y + contour[2].y) / 2.0;
    let lower = (contour[4].y + contour[5].y) / 2.0;
    Ok(Point::new(x, (upper + lower) / 2.0))
}

fn finite(p: Point, what: &'static str) -> Result<Point, BehaviorError> {
    if p.is_finite() {
        Ok(p)
    } else {
        Err(BehaviorError::Degenerate(what))
    }
}

/// Angle of the line from `to` towards `from`, in degrees
fn angle_degrees(from: Point, to: Point) -> f32 {
    (from.y - to.y).atan2(from.x - to.x).to_degrees()
}
