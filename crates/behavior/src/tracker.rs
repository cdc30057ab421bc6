//! Looking-away hysteresis tracker

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::signals::{GazeDirection, HeadPose};
use crate::BehaviorConfig;

/// Tracker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackerState {
    #[default]
    Attentive,
    Away { started_at: Instant },
}

/// Completed away-episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookingAwayEvent {
    pub started_at: Instant,
    pub duration: Duration,
}

/// Result of one observation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AwayStatus {
    pub looking_away: bool,
    /// Length of the ongoing episode, zero when attentive
    pub duration: Duration,
}

/// Tracks away-episodes and keeps a log of completed ones.
///
/// Episodes shorter than the minimum leave no trace, so momentary detector
/// jitter never reaches the log.
#[derive(Debug, Clone)]
pub struct LookingAwayTracker {
    state: TrackerState,
    events: VecDeque<LookingAwayEvent>,
    yaw_threshold: f32,
    pitch_threshold: f32,
    roll_threshold: f32,
    min_episode: Duration,
    window: Duration,
}

impl Default for LookingAwayTracker {
    fn default() -> Self {
        Self::new(&BehaviorConfig::default())
    }
}

impl LookingAwayTracker {
    pub fn new(config: &BehaviorConfig) -> Self {
        Self {
            state: TrackerState::Attentive,
            events: VecDeque::new(),
            yaw_threshold: config.away_yaw_threshold,
            pitch_threshold: config.away_pitch_threshold,
            roll_threshold: config.away_roll_threshold_degrees,
            min_episode: config.min_away_episode(),
            window: config.event_window(),
        }
    }

    /// Whether a single observation counts as looking away.
    ///
    /// [`GazeDirection::Away`] does not trigger on its own; only the pose
    /// thresholds apply to it.
    pub fn is_away(&self, gaze: GazeDirection, pose: &HeadPose) -> bool {
        let gaze_off = !matches!(gaze, GazeDirection::Center | GazeDirection::Away);
        gaze_off
            || pose.yaw.abs() > self.yaw_threshold
            || pose.pitch.abs() > self.pitch_threshold
            || pose.roll.abs() > self.roll_threshold
    }

    /// Advance the state machine with an observation taken at `now`
    pub fn observe(&mut self, gaze: GazeDirection, pose: &HeadPose, now: Instant) -> AwayStatus {
        let away = self.is_away(gaze, pose);

        let status = match (self.state, away) {
            (TrackerState::Attentive, true) => {
                debug!("Looking away started");
                self.state = TrackerState::Away { started_at: now };
                AwayStatus {
                    looking_away: true,
                    duration: Duration::ZERO,
                }
            }
            (TrackerState::Away { started_at }, true) => AwayStatus {
                looking_away: true,
                duration: now.saturating_duration_since(started_at),
            },
            (TrackerState::Away { started_at }, false) => {
                let duration = now.saturating_duration_since(started_at);
                if duration >= self.min_episode {
                    debug!("Looking away ended after {:.1}s", duration.as_secs_f32());
                    self.events.push_back(LookingAwayEvent {
                        started_at,
                        duration,
                    });
                }
                self.state = TrackerState::Attentive;
                AwayStatus::default()
            }
            (TrackerState::Attentive, false) => AwayStatus::default(),
        };

        self.prune(now);
        status
    }

    fn prune(&mut self, now: Instant) {
        while let Some(oldest) = self.events.front() {
            if now.saturating_duration_since(oldest.started_at) > self.window {
                self.events.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Completed episodes within the trailing window, oldest first
    pub fn events(&self) -> &VecDeque<LookingAwayEvent> {
        &self.events
    }
}
