//! Behavior pipeline configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Thresholds and windows for the behavior pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Horizontal gaze ratio beyond which gaze is LEFT/RIGHT
    pub horizontal_gaze_threshold: f32,

    /// Vertical gaze ratio beyond which gaze is UP/DOWN
    pub vertical_gaze_threshold: f32,

    /// Neutral vertical gaze ratio subtracted before classification.
    ///
    /// The vertical ratio is `(eye_mid.y - nose.y) / eye_separation`, which
    /// is negative on a frontal face because the nose tip sits below the
    /// eyes. At the default `0.0` such a face classifies as `Down`, counts
    /// as looking away, and scores 70. Landmark sets with the nose tip about
    /// half an eye-separation below the eye line need `-0.5`.
    pub vertical_gaze_offset: f32,

    /// |yaw| above which the subject counts as looking away
    pub away_yaw_threshold: f32,

    /// |pitch| above which the subject counts as looking away
    pub away_pitch_threshold: f32,

    /// |roll| above which the subject counts as looking away (degrees)
    pub away_roll_threshold_degrees: f32,

    /// Shortest away-episode that is logged (milliseconds)
    pub min_away_episode_ms: u64,

    /// Trailing window of logged away-episodes (seconds)
    pub event_window_secs: u64,

    /// Attention samples retained
    pub attention_history_len: usize,

    /// More logged episodes than this is "frequent"
    pub frequent_away_count: usize,

    /// Total logged away time above this is "extended" (seconds)
    pub extended_inattention_secs: u64,

    /// Attention samples inspected for a declining trend
    pub trend_window: usize,

    /// Mean successive attention delta below this is "declining"
    pub declining_trend_delta: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            horizontal_gaze_threshold: 0.15,
            vertical_gaze_threshold: 0.10,
            vertical_gaze_offset: 0.0,
            away_yaw_threshold: 0.25,
            away_pitch_threshold: 0.20,
            away_roll_threshold_degrees: 15.0,
            min_away_episode_ms: 1000,
            event_window_secs: 600,
            attention_history_len: 10,
            frequent_away_count: 5,
            extended_inattention_secs: 120,
            trend_window: 5,
            declining_trend_delta: -10.0,
        }
    }
}

impl BehaviorConfig {
    pub fn min_away_episode(&self) -> Duration {
        Duration::from_millis(self.min_away_episode_ms)
    }

    pub fn event_window(&self) -> Duration {
        Duration::from_secs(self.event_window_secs)
    }

    pub fn extended_inattention(&self) -> Duration {
        Duration::from_secs(self.extended_inattention_secs)
    }
}
