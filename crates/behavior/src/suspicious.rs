//! Pattern rules over the away-episode log and attention trend

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::attention::AttentionSample;
use crate::tracker::LookingAwayEvent;
use crate::BehaviorConfig;

/// Suspicious behavior patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuspiciousFlag {
    /// Too many away-episodes in the window
    FrequentLookingAway,
    /// Too much total away time in the window
    ExtendedInattention,
    /// Attention falling steadily
    DecliningAttention,
}

impl fmt::Display for SuspiciousFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SuspiciousFlag::FrequentLookingAway => "Frequent looking away detected",
            SuspiciousFlag::ExtendedInattention => "Extended periods of inattention detected",
            SuspiciousFlag::DecliningAttention => "Declining attention trend detected",
        };
        f.write_str(msg)
    }
}

/// Rule evaluator
#[derive(Debug, Clone)]
pub struct SuspiciousBehaviorDetector {
    frequent_count: usize,
    extended_total: Duration,
    trend_window: usize,
    declining_delta: f32,
}

impl Default for SuspiciousBehaviorDetector {
    fn default() -> Self {
        Self::new(&BehaviorConfig::default())
    }
}

impl SuspiciousBehaviorDetector {
    pub fn new(config: &BehaviorConfig) -> Self {
        Self {
            frequent_count: config.frequent_away_count,
            extended_total: config.extended_inattention(),
            trend_window: config.trend_window.max(2),
            declining_delta: config.declining_trend_delta,
        }
    }

    /// Flags raised by the current log and attention history
    pub fn evaluate(
        &self,
        events: &VecDeque<LookingAwayEvent>,
        history: &VecDeque<AttentionSample>,
    ) -> Vec<SuspiciousFlag> {
        let mut flags = Vec::new();

        if events.len() > self.frequent_count {
            flags.push(SuspiciousFlag::FrequentLookingAway);
        }

        let total: Duration = events.iter().map(|e| e.duration).sum();
        if total > self.extended_total {
            flags.push(SuspiciousFlag::ExtendedInattention);
        }

        if let Some(delta) = self.mean_recent_delta(history) {
            if delta < self.declining_delta {
                flags.push(SuspiciousFlag::DecliningAttention);
            }
        }

        flags
    }

    /// Mean successive delta over the trend window; `None` until the
    /// window is full
    fn mean_recent_delta(&self, history: &VecDeque<AttentionSample>) -> Option<f32> {
        if history.len() < self.trend_window {
            return None;
        }
        let recent: Vec<f32> = history
            .iter()
            .skip(history.len() - self.trend_window)
            .map(|s| s.score)
            .collect();
        let sum: f32 = recent.windows(2).map(|w| w[1] - w[0]).sum();
        Some(sum / (recent.len() - 1) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn events(durations_secs: &[u64]) -> VecDeque<LookingAwayEvent> {
        let t0 = Instant::now();
        durations_secs
            .iter()
            .map(|&d| LookingAwayEvent {
                started_at: t0,
                duration: Duration::from_secs(d),
            })
            .collect()
    }

    fn history(scores: &[f32]) -> VecDeque<AttentionSample> {
        let t0 = Instant::now();
        scores
            .iter()
            .map(|&score| AttentionSample {
                score,
                observed_at: t0,
            })
            .collect()
    }

    #[test]
    fn test_frequent_needs_more_than_five() {
        let detector = SuspiciousBehaviorDetector::default();
        assert!(detector.evaluate(&events(&[1; 5]), &history(&[])).is_empty());
        assert_eq!(
            detector.evaluate(&events(&[1; 6]), &history(&[])),
            vec![SuspiciousFlag::FrequentLookingAway]
        );
    }

    #[test]
    fn test_extended_inattention_total() {
        let detector = SuspiciousBehaviorDetector::default();
        assert!(detector.evaluate(&events(&[60, 60]), &history(&[])).is_empty());
        assert_eq!(
            detector.evaluate(&events(&[60, 61]), &history(&[])),
            vec![SuspiciousFlag::ExtendedInattention]
        );
    }

    #[test]
    fn test_declining_trend_uses_last_five() {
        let detector = SuspiciousBehaviorDetector::default();
        // Mean delta over the last five: (-15 * 4) / 4 = -15
        let falling = history(&[20.0, 100.0, 85.0, 70.0, 55.0, 40.0]);
        assert_eq!(
            detector.evaluate(&VecDeque::new(), &falling),
            vec![SuspiciousFlag::DecliningAttention]
        );

        // -10 exactly is not below the threshold
        let gentle = history(&[100.0, 90.0, 80.0, 70.0, 60.0]);
        assert!(detector.evaluate(&VecDeque::new(), &gentle).is_empty());

        // Too few samples
        let short = history(&[100.0, 40.0, 0.0]);
        assert!(detector.evaluate(&VecDeque::new(), &short).is_empty());
    }

    #[test]
    fn test_flag_messages() {
        assert_eq!(
            SuspiciousFlag::FrequentLookingAway.to_string(),
            "Frequent looking away detected"
        );
    }
}
