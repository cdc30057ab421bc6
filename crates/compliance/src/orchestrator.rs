//! Per-tick compliance orchestration

use std::sync::Arc;
use std::time::Duration;

use behavior::{BehaviorConfig, BehaviorMonitor, BehaviorSnapshot, GazeDirection};
use detector_backend::{DetectOptions, DetectionResult, DetectorBackend, Frame, ObjectDetection};
use metrics::counter;
use tokio::sync::Mutex;
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

use crate::objects::categorize_objects;
use crate::result::ComplianceResult;
use crate::settings::MonitoringSettings;
use crate::warning::ComplianceWarning;
use crate::ComplianceError;

/// Ongoing away-episode length that raises a warning
const EXTENDED_AWAY: Duration = Duration::from_secs(3);
/// Attention below this raises a warning
const LOW_ATTENTION: f32 = 50.0;
/// |yaw| above this raises a warning
const HEAD_TURNED_YAW: f32 = 0.5;

/// Primary detector backend with an optional fallback
#[derive(Clone)]
pub struct BackendPair {
    primary: Arc<dyn DetectorBackend>,
    fallback: Option<Arc<dyn DetectorBackend>>,
}

impl BackendPair {
    pub fn new(primary: Arc<dyn DetectorBackend>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn DetectorBackend>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    fn get(&self, active: ActiveBackend) -> &Arc<dyn DetectorBackend> {
        match (active, &self.fallback) {
            (ActiveBackend::Fallback, Some(fallback)) => fallback,
            _ => &self.primary,
        }
    }
}

/// Which backend serves detections. Only ever moves Primary -> Fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveBackend {
    #[default]
    Primary,
    Fallback,
}

/// Mutable per-session state, guarded so only one tick runs at a time
struct PipelineState {
    active: ActiveBackend,
    behavior: BehaviorMonitor,
}

/// Coordinates one monitoring session's ticks.
///
/// Owns the session's behavior history; create a new one per session.
pub struct ComplianceOrchestrator {
    backends: BackendPair,
    detection_timeout: Duration,
    state: Mutex<PipelineState>,
}

impl ComplianceOrchestrator {
    pub fn new(
        backends: BackendPair,
        config: &BehaviorConfig,
        detection_timeout: Duration,
    ) -> Self {
        info!(
            "Creating compliance orchestrator: primary={}, fallback={}",
            backends.primary.name(),
            backends.fallback.as_ref().map(|b| b.name()).unwrap_or("none")
        );
        Self {
            backends,
            detection_timeout,
            state: Mutex::new(PipelineState {
                active: ActiveBackend::Primary,
                behavior: BehaviorMonitor::new(config),
            }),
        }
    }

    /// Evaluate one frame.
    ///
    /// Returns `None` without touching any state when the previous tick's
    /// detection is still in flight.
    pub async fn tick(
        &self,
        frame: &Frame,
        settings: &MonitoringSettings,
    ) -> Option<ComplianceResult> {
        let Ok(mut state) = self.state.try_lock() else {
            debug!("Previous tick still in flight, skipping frame {}", frame.sequence);
            counter!("compliance_ticks_skipped_total").increment(1);
            return None;
        };
        counter!("compliance_ticks_total").increment(1);

        if !settings.enable_face_detection {
            return Some(ComplianceResult::neutral());
        }

        Some(self.evaluate(&mut state, frame, settings).await)
    }

    /// Backend currently serving detections
    pub async fn active_backend(&self) -> ActiveBackend {
        self.state.lock().await.active
    }

    async fn evaluate(
        &self,
        state: &mut PipelineState,
        frame: &Frame,
        settings: &MonitoringSettings,
    ) -> ComplianceResult {
        let mut result = ComplianceResult::neutral();
        let min_confidence = settings.face_min_confidence();

        let (detection, detector_down) = match self
            .detect_faces(state, frame, DetectOptions::with_min_confidence(min_confidence))
            .await
        {
            Ok(detection) => (detection.sanitized(), false),
            Err(e) => {
                warn!("Face detection unavailable, reporting no face: {}", e);
                (DetectionResult::empty(), true)
            }
        };

        result.face_detected = detection.has_face;
        result.face_count = detection.face_count;
        result.face_confidence = detection.primary_confidence * 100.0;

        if !detection.has_face {
            result.warn(ComplianceWarning::NoFace);
        }
        if detection.face_count > 1 {
            result.warn(ComplianceWarning::MultipleFaces);
        }
        if detection.primary_confidence < min_confidence {
            result.warn(ComplianceWarning::LowFaceConfidence);
        }
        if detector_down {
            result.warn(ComplianceWarning::SystemError);
        }

        if let [face] = detection.faces.as_slice() {
            if let Some(landmarks) = &face.landmarks {
                let snapshot = state.behavior.observe(landmarks, Instant::now().into_std());
                apply_behavior(&mut result, snapshot);
            }
        }

        if settings.enable_object_detection {
            let options = DetectOptions::with_min_confidence(settings.object_min_confidence());
            match self.detect_objects(state, frame, options).await {
                Ok(objects) => {
                    let categories = categorize_objects(&objects);
                    for category in &categories {
                        result.warn(ComplianceWarning::Object(*category));
                    }
                    result.objects_detected = categories;
                }
                Err(e) => warn!("Object detection unavailable, skipping: {}", e),
            }
        }

        result
    }

    async fn detect_faces(
        &self,
        state: &mut PipelineState,
        frame: &Frame,
        options: DetectOptions,
    ) -> Result<DetectionResult, ComplianceError> {
        loop {
            let backend = self.backends.get(state.active);
            let call = backend.detect_faces(frame, options);
            let err = match timeout(self.detection_timeout, call).await {
                Ok(Ok(detection)) => return Ok(detection),
                Ok(Err(source)) => ComplianceError::Backend {
                    backend: backend.name().to_string(),
                    source,
                },
                Err(_) => self.timeout_error(backend.as_ref()),
            };
            if !self.fall_back(state, &err) {
                return Err(err);
            }
        }
    }

    async fn detect_objects(
        &self,
        state: &mut PipelineState,
        frame: &Frame,
        options: DetectOptions,
    ) -> Result<Vec<ObjectDetection>, ComplianceError> {
        loop {
            let backend = self.backends.get(state.active);
            let call = backend.detect_objects(frame, options);
            let err = match timeout(self.detection_timeout, call).await {
                Ok(Ok(objects)) => return Ok(objects),
                Ok(Err(source)) => ComplianceError::Backend {
                    backend: backend.name().to_string(),
                    source,
                },
                Err(_) => self.timeout_error(backend.as_ref()),
            };
            if !self.fall_back(state, &err) {
                return Err(err);
            }
        }
    }

    fn timeout_error(&self, backend: &dyn DetectorBackend) -> ComplianceError {
        ComplianceError::Timeout {
            backend: backend.name().to_string(),
            timeout_ms: self.detection_timeout.as_millis() as u64,
        }
    }

    /// Record a backend failure; switch to the fallback if still on the
    /// primary. Returns whether the call should be retried.
    fn fall_back(&self, state: &mut PipelineState, err: &ComplianceError) -> bool {
        counter!("detector_failures_total").increment(1);
        match (&self.backends.fallback, state.active) {
            (Some(fallback), ActiveBackend::Primary) => {
                warn!("Primary backend failed: {}", err);
                info!(
                    "Switching to fallback backend {} for the rest of the session",
                    fallback.name()
                );
                counter!("detector_fallback_activations_total").increment(1);
                state.active = ActiveBackend::Fallback;
                true
            }
            _ => false,
        }
    }
}

fn apply_behavior(result: &mut ComplianceResult, snapshot: BehaviorSnapshot) {
    result.gaze_direction = snapshot.gaze;
    result.head_pose = snapshot.pose;
    result.attention_score = snapshot.attention_score;
    result.looking_away = snapshot.looking_away;
    result.looking_away_duration = snapshot.looking_away_duration.as_secs_f32();

    if snapshot.looking_away_duration > EXTENDED_AWAY {
        let seconds = snapshot.looking_away_duration.as_secs_f32().round() as u64;
        result.warn(ComplianceWarning::ExtendedLookingAway { seconds });
    } else if snapshot.gaze != GazeDirection::Center {
        result.warn(ComplianceWarning::GazeNotCentered);
    }
    if snapshot.attention_score < LOW_ATTENTION {
        result.warn(ComplianceWarning::LowAttention);
    }
    if snapshot.pose.yaw.abs() > HEAD_TURNED_YAW {
        result.warn(ComplianceWarning::HeadTurned);
    }
    for flag in snapshot.flags {
        result.warn(ComplianceWarning::Suspicious(flag));
    }
}
