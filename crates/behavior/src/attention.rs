//! Attention scoring with a rolling history

use std::collections::VecDeque;
use std::time::Instant;

use crate::signals::{GazeDirection, HeadPose};

/// Penalty for any non-centered gaze
const GAZE_PENALTY: f32 = 30.0;
/// Penalty per unit of |yaw| and |pitch|
const POSE_PENALTY: f32 = 40.0;
/// Penalty per degree of |roll|
const ROLL_PENALTY: f32 = 0.5;

/// One scored observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttentionSample {
    /// Score (0-100)
    pub score: f32,
    pub observed_at: Instant,
}

/// Attention score for a gaze/pose pair, clamped to `[0, 100]`.
///
/// Non-finite inputs score 0.
pub fn attention_score(gaze: GazeDirection, pose: &HeadPose) -> f32 {
    let gaze_penalty = if gaze != GazeDirection::Center {
        GAZE_PENALTY
    } else {
        0.0
    };
    let score = 100.0
        - gaze_penalty
        - pose.yaw.abs() * POSE_PENALTY
        - pose.pitch.abs() * POSE_PENALTY
        - pose.roll.abs() * ROLL_PENALTY;

    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Scores observations and keeps the most recent ones
#[derive(Debug, Clone)]
pub struct AttentionScorer {
    history: VecDeque<AttentionSample>,
    capacity: usize,
}

impl AttentionScorer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Score an observation and append it to the history
    pub fn score(&mut self, gaze: GazeDirection, pose: &HeadPose, now: Instant) -> f32 {
        let score = attention_score(gaze, pose);
        if self.history.len() >= self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(AttentionSample {
            score,
            observed_at: now,
        });
        score
    }

    /// Samples, oldest first
    pub fn history(&self) -> &VecDeque<AttentionSample> {
        &self.history
    }

    /// Most recent score
    pub fn latest(&self) -> Option<f32> {
        self.history.back().map(|s| s.score)
    }
}
