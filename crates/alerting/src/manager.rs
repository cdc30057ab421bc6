//! Violation emission bookkeeping

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Emission state of one violation type
#[derive(Debug, Clone)]
pub struct ViolationState {
    /// Last time this violation was emitted
    pub last_fired: Instant,
    /// Number of times emitted
    pub fire_count: usize,
}

/// Tracks emitted violations per type and applies an optional cooldown.
///
/// Without a cooldown every occurrence is emitted.
#[derive(Debug, Clone, Default)]
pub struct ViolationManager {
    cooldown: Option<Duration>,
    states: HashMap<&'static str, ViolationState>,
}

impl ViolationManager {
    pub fn new(cooldown: Option<Duration>) -> Self {
        Self {
            cooldown,
            states: HashMap::new(),
        }
    }

    /// Check if a violation of this type may be emitted at `now`
    pub fn should_fire(&self, violation_type: &str, now: Instant) -> bool {
        let (Some(cooldown), Some(state)) = (self.cooldown, self.states.get(violation_type)) else {
            return true;
        };
        if now.saturating_duration_since(state.last_fired) < cooldown {
            debug!("Violation {} suppressed: in cooldown period", violation_type);
            return false;
        }
        true
    }

    /// Record that a violation was emitted
    pub fn record_fire(&mut self, violation_type: &'static str, now: Instant) {
        let state = self.states.entry(violation_type).or_insert(ViolationState {
            last_fired: now,
            fire_count: 0,
        });
        state.last_fired = now;
        state.fire_count += 1;
    }

    /// Times a violation type has been emitted
    pub fn fire_count(&self, violation_type: &str) -> usize {
        self.states.get(violation_type).map_or(0, |s| s.fire_count)
    }

    /// Clear all violation states
    pub fn clear(&mut self) {
        self.states.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_cooldown_always_fires() {
        let mut manager = ViolationManager::new(None);
        let now = Instant::now();
        for _ in 0..3 {
            assert!(manager.should_fire("no_face", now));
            manager.record_fire("no_face", now);
        }
        assert_eq!(manager.fire_count("no_face"), 3);
    }

    #[test]
    fn test_cooldown_deduplicates() {
        let mut manager = ViolationManager::new(Some(Duration::from_secs(60)));
        let t0 = Instant::now();

        assert!(manager.should_fire("mobile_phone", t0));
        manager.record_fire("mobile_phone", t0);

        assert!(!manager.should_fire("mobile_phone", t0 + Duration::from_secs(30)));
        assert!(manager.should_fire("no_face", t0 + Duration::from_secs(30)));
        assert!(manager.should_fire("mobile_phone", t0 + Duration::from_secs(60)));
    }

    #[test]
    fn test_clear() {
        let mut manager = ViolationManager::new(Some(Duration::from_secs(60)));
        let t0 = Instant::now();
        manager.record_fire("no_face", t0);
        manager.clear();
        assert!(manager.should_fire("no_face", t0));
        assert_eq!(manager.fire_count("no_face"), 0);
    }
}
