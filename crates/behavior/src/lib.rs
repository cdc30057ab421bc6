//! Behavioral Signal Processing
//!
//! Turns single-face landmarks into attention signals:
//! - Gaze direction and head pose from landmark geometry
//! - Bounded attention score with a rolling history
//! - Hysteresis tracking of looking-away episodes
//! - Pattern rules over the episode log and attention trend

pub mod attention;
pub mod config;
pub mod signals;
pub mod suspicious;
pub mod tracker;

pub use attention::{attention_score, AttentionSample, AttentionScorer};
pub use config::BehaviorConfig;
pub use signals::{GazeDirection, HeadPose, SignalExtractor};
pub use suspicious::{SuspiciousBehaviorDetector, SuspiciousFlag};
pub use tracker::{AwayStatus, LookingAwayEvent, LookingAwayTracker, TrackerState};

use std::time::{Duration, Instant};

use detector_backend::FaceLandmarks;
use thiserror::Error;

/// Behavior pipeline error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BehaviorError {
    #[error("Keypoints missing: {0}")]
    KeypointsMissing(&'static str),

    #[error("Degenerate landmark geometry: {0}")]
    Degenerate(&'static str),
}

/// Everything the pipeline derived from one observation
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorSnapshot {
    pub gaze: GazeDirection,
    pub pose: HeadPose,
    pub attention_score: f32,
    pub looking_away: bool,
    pub looking_away_duration: Duration,
    pub flags: Vec<SuspiciousFlag>,
}

/// Per-session behavior state: runs extraction, scoring, tracking, and
/// pattern rules in sequence
#[derive(Debug, Clone)]
pub struct BehaviorMonitor {
    extractor: SignalExtractor,
    scorer: AttentionScorer,
    tracker: LookingAwayTracker,
    detector: SuspiciousBehaviorDetector,
}

impl Default for BehaviorMonitor {
    fn default() -> Self {
        Self::new(&BehaviorConfig::default())
    }
}

impl BehaviorMonitor {
    pub fn new(config: &BehaviorConfig) -> Self {
        Self {
            extractor: SignalExtractor::new(config),
            scorer: AttentionScorer::new(config.attention_history_len),
            tracker: LookingAwayTracker::new(config),
            detector: SuspiciousBehaviorDetector::new(config),
        }
    }

    /// Analyze one face's landmarks observed at `now`
    pub fn observe(&mut self, landmarks: &FaceLandmarks, now: Instant) -> BehaviorSnapshot {
        let (gaze, pose) = self.extractor.extract(landmarks);
        let attention_score = self.scorer.score(gaze, &pose, now);
        let away = self.tracker.observe(gaze, &pose, now);
        let flags = self
            .detector
            .evaluate(self.tracker.events(), self.scorer.history());

        BehaviorSnapshot {
            gaze,
            pose,
            attention_score,
            looking_away: away.looking_away,
            looking_away_duration: away.duration,
            flags,
        }
    }

    pub fn tracker(&self) -> &LookingAwayTracker {
        &self.tracker
    }

    pub fn scorer(&self) -> &AttentionScorer {
        &self.scorer
    }
}
