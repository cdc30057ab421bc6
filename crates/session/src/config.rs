//! Session configuration

use std::time::Duration;

use alerting::StabilizerConfig;
use behavior::BehaviorConfig;
use compliance::MonitoringSettings;
use serde::{Deserialize, Serialize};

use crate::SessionError;

/// Everything fixed at session start.
///
/// `behavior.vertical_gaze_offset` defaults to `0.0`, which reads a frontal
/// face with the nose tip below the eyes as looking down. Calibrate it for
/// the detector's landmark geometry (`-0.5` for most face meshes).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub timing: TimingConfig,
    pub monitoring: MonitoringSettings,
    pub behavior: BehaviorConfig,
    pub stabilizer: StabilizerConfig,
}

/// Tick cadence and detector deadline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub tick_interval_ms: u64,
    pub detection_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            detection_timeout_ms: 5000,
        }
    }
}

impl SessionConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.timing.tick_interval_ms)
    }

    pub fn detection_timeout(&self) -> Duration {
        Duration::from_millis(self.timing.detection_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.timing.tick_interval_ms == 0 {
            return Err(SessionError::InvalidConfig("tick_interval_ms must be positive".into()));
        }
        if self.timing.detection_timeout_ms == 0 {
            return Err(SessionError::InvalidConfig("detection_timeout_ms must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.detection_timeout(), Duration::from_secs(5));
        assert_eq!(config.stabilizer.warning_settle_ms, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "timing": {"tick_interval_ms": 250},
            "monitoring": {"face_detection_sensitivity": 80}
        }"#;
        let config: SessionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.timing.tick_interval_ms, 250);
        assert_eq!(config.timing.detection_timeout_ms, 5000);
        assert_eq!(config.monitoring.face_detection_sensitivity, 80.0);
        assert!(config.monitoring.enable_object_detection);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = SessionConfig::default();
        config.timing.tick_interval_ms = 0;
        assert!(matches!(config.validate(), Err(SessionError::InvalidConfig(_))));
    }
}
