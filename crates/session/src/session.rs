//! Session lifecycle

use std::sync::Arc;

use alerting::{DetectionStatus, StabilizerEvent, ViolationStabilizer};
use compliance::{BackendPair, ComplianceOrchestrator, ComplianceResult, MonitoringSettings};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::source::FrameSource;
use crate::SessionError;

/// Streams a running session delivers to the UI layer
pub struct SessionOutputs {
    /// Raw result of every evaluated tick
    pub results: mpsc::UnboundedReceiver<ComplianceResult>,
    /// Violations and resolutions
    pub events: mpsc::UnboundedReceiver<StabilizerEvent>,
    /// Smoothed detection status
    pub status: watch::Receiver<DetectionStatus>,
}

/// One proctoring run.
///
/// Dropping a session without calling [`MonitoringSession::stop`] aborts
/// its task, which also cancels the stabilizer's timers.
pub struct MonitoringSession {
    id: Uuid,
    orchestrator: Arc<ComplianceOrchestrator>,
    backends: BackendPair,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl MonitoringSession {
    /// Start ticking. Every session gets a fresh orchestrator so no
    /// history carries over from a previous run.
    pub fn start(
        config: SessionConfig,
        backends: BackendPair,
        source: Arc<dyn FrameSource>,
    ) -> Result<(Self, SessionOutputs), SessionError> {
        config.validate()?;

        let id = Uuid::new_v4();
        let orchestrator = Arc::new(ComplianceOrchestrator::new(
            backends.clone(),
            &config.behavior,
            config.detection_timeout(),
        ));
        let (stabilizer, stabilizer_outputs) = ViolationStabilizer::new(config.stabilizer.clone());
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let ticker = Ticker {
            orchestrator: Arc::clone(&orchestrator),
            source,
            settings: config.monitoring.clone(),
            stabilizer,
            results: results_tx,
            period: config.tick_interval(),
        };
        let span = info_span!("session", id = %id);
        let task = tokio::spawn(ticker.run(shutdown_rx).instrument(span));

        info!("Monitoring session {} started ({}ms interval)", id, config.timing.tick_interval_ms);

        let session = Self {
            id,
            orchestrator,
            backends,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        };
        let outputs = SessionOutputs {
            results: results_rx,
            events: stabilizer_outputs.events,
            status: stabilizer_outputs.status,
        };
        Ok((session, outputs))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Orchestrator of this session. Ticking it outside the session feeds
    /// this session's behavior history.
    pub fn orchestrator(&self) -> &Arc<ComplianceOrchestrator> {
        &self.orchestrator
    }

    /// Detector backends of this session. A preview timer builds its own
    /// orchestrator from these so it shares the detectors but not the state.
    pub fn backends(&self) -> &BackendPair {
        &self.backends
    }

    /// Stop ticking and wait for the session task to finish
    pub async fn stop(mut self) -> Result<(), SessionError> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            task.await?;
        }
        info!("Monitoring session {} stopped", self.id);
        Ok(())
    }
}

impl Drop for MonitoringSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            debug!("Session {} dropped while running, aborting", self.id);
            task.abort();
        }
    }
}

struct Ticker {
    orchestrator: Arc<ComplianceOrchestrator>,
    source: Arc<dyn FrameSource>,
    settings: MonitoringSettings,
    stabilizer: ViolationStabilizer,
    results: mpsc::UnboundedSender<ComplianceResult>,
    period: Duration,
}

impl Ticker {
    async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            let Some(frame) = self.source.capture().await else {
                debug!("No frame available, skipping tick");
                continue;
            };
            let Some(result) = self.orchestrator.tick(&frame, &self.settings).await else {
                continue;
            };

            self.stabilizer.submit(&result);
            if self.results.send(result).is_err() {
                debug!("Result receiver dropped");
            }
        }

        self.stabilizer.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SyntheticFrameSource;
    use alerting::Severity;
    use async_trait::async_trait;
    use compliance::ComplianceWarning;
    use detector_backend::{Frame, ScriptedBackend, SyntheticFace};
    use tokio::time::sleep;

    struct NoFrames;

    #[async_trait]
    impl FrameSource for NoFrames {
        async fn capture(&self) -> Option<Frame> {
            None
        }
    }

    fn drain<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> Vec<T> {
        let mut items = Vec::new();
        while let Ok(item) = rx.try_recv() {
            items.push(item);
        }
        items
    }

    fn source() -> Arc<dyn FrameSource> {
        Arc::new(SyntheticFrameSource::new(640, 480))
    }

    fn start(backend: Arc<ScriptedBackend>) -> (MonitoringSession, SessionOutputs) {
        start_with(backend, source())
    }

    fn start_with(
        backend: Arc<ScriptedBackend>,
        source: Arc<dyn FrameSource>,
    ) -> (MonitoringSession, SessionOutputs) {
        MonitoringSession::start(SessionConfig::default(), BackendPair::new(backend), source)
            .unwrap()
    }

    fn frontal_backend() -> Arc<ScriptedBackend> {
        let face = SyntheticFace::frontal().detection();
        Arc::new(ScriptedBackend::new("scripted").with_faces(vec![face]))
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_ticks_on_interval() {
        let backend = frontal_backend();
        let (session, mut outputs) = start(backend.clone());

        sleep(Duration::from_millis(3500)).await;
        session.stop().await.unwrap();

        let results = drain(&mut outputs.results);
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.face_detected && r.face_count == 1));
        assert_eq!(backend.face_calls(), 4);
        assert_eq!(outputs.status.borrow().face_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_absence_violations_reach_consumer() {
        let (session, mut outputs) = start(Arc::new(ScriptedBackend::new("scripted")));

        sleep(Duration::from_millis(2500)).await;
        session.stop().await.unwrap();

        let violations: Vec<_> = drain(&mut outputs.events)
            .into_iter()
            .filter_map(|event| match event {
                StabilizerEvent::Violation(record) => Some(record),
                StabilizerEvent::Resolved => None,
            })
            .collect();
        let absences: Vec<_> = violations
            .iter()
            .filter(|v| v.violation_type == "no_face")
            .collect();
        assert_eq!(absences.len(), 3);
        assert!(absences.iter().all(|v| v.severity == Severity::High));
        assert_eq!(violations.len(), 6);
        assert!(violations
            .iter()
            .all(|v| v.violation_type == "no_face" || v.violation_type == "low_face_confidence"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_frames_skip_ticks() {
        let backend = Arc::new(ScriptedBackend::new("scripted"));
        let (session, mut outputs) = start_with(backend.clone(), Arc::new(NoFrames));

        sleep(Duration::from_millis(2500)).await;
        session.stop().await.unwrap();

        assert!(drain(&mut outputs.results).is_empty());
        assert_eq!(backend.face_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_delivered_after_stop() {
        let (session, mut outputs) = start(Arc::new(ScriptedBackend::new("scripted")));

        sleep(Duration::from_millis(100)).await;
        session.stop().await.unwrap();
        let _ = drain(&mut outputs.events);
        let status_before = *outputs.status.borrow();

        sleep(Duration::from_millis(5000)).await;

        // Channels close once the session task and its timers are gone
        assert!(outputs.events.recv().await.is_none());
        assert!(outputs.results.recv().await.is_some());
        assert!(outputs.results.recv().await.is_none());
        assert_eq!(*outputs.status.borrow(), status_before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_starts_with_fresh_history() {
        let away = SyntheticFace::frontal().yaw(0.4).detection();
        let backend = Arc::new(ScriptedBackend::new("scripted").with_faces(vec![away]));

        let (first, _outputs) = start(backend.clone());
        sleep(Duration::from_millis(4500)).await;
        first.stop().await.unwrap();

        let (second, mut outputs) = start(backend);
        sleep(Duration::from_millis(100)).await;
        second.stop().await.unwrap();

        let results = drain(&mut outputs.results);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].looking_away_duration, 0.0);
        assert!(!results[0]
            .warnings
            .iter()
            .any(|w| matches!(w, ComplianceWarning::ExtendedLookingAway { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_preview_shares_backends_not_history() {
        let away = SyntheticFace::frontal().yaw(0.4).detection();
        let backend = Arc::new(ScriptedBackend::new("scripted").with_faces(vec![away]));
        let (session, mut outputs) = start(backend.clone());

        let preview = ComplianceOrchestrator::new(
            session.backends().clone(),
            &SessionConfig::default().behavior,
            Duration::from_secs(5),
        );
        let settings = MonitoringSettings::default();
        let frame = Frame::blank(640, 480, 0, 0);

        sleep(Duration::from_millis(4500)).await;
        let preview_result = preview.tick(&frame, &settings).await.unwrap();
        session.stop().await.unwrap();

        // The preview's first observation starts its own away-episode
        assert_eq!(preview_result.looking_away_duration, 0.0);
        let session_results = drain(&mut outputs.results);
        assert_eq!(session_results.len(), 5);
        assert!(session_results[4].looking_away_duration >= 4.0);
        assert_eq!(backend.face_calls(), 6);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SessionConfig::default();
        config.timing.tick_interval_ms = 0;
        let backend = Arc::new(ScriptedBackend::new("scripted"));
        let result = MonitoringSession::start(config, BackendPair::new(backend), source());
        assert!(matches!(result, Err(SessionError::InvalidConfig(_))));
    }
}
