//! Debounced status and violation signaling
//!
//! Raw per-tick results jitter. Two independently cancellable timer
//! channels smooth them for display:
//! - status: the latest value is published after `status_delay_ms`
//! - warnings: the raw list replaces the stable list after
//!   `warning_settle_ms`; dropping out of a critical category signals
//!   a resolution exactly once per transition
//!
//! Violations themselves are emitted per tick (optionally gated by a
//! per-type cooldown) and are not debounced.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use compliance::{ComplianceResult, ComplianceWarning};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::manager::ViolationManager;
use crate::status::DetectionStatus;
use crate::violation::{is_critical_category, ViolationRecord};

/// Stabilizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    /// Display lag of the detection status
    pub status_delay_ms: u64,
    /// Settle window before raw warnings replace the stable list
    pub warning_settle_ms: u64,
    /// Per-type deduplication window for violations; unset emits every tick
    pub violation_cooldown_ms: Option<u64>,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            status_delay_ms: 500,
            warning_settle_ms: 1000,
            violation_cooldown_ms: None,
        }
    }
}

/// Event delivered to the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum StabilizerEvent {
    Violation(ViolationRecord),
    /// A critical violation has cleared
    Resolved,
}

/// Receiving ends handed to the consumer
pub struct StabilizerOutputs {
    pub events: mpsc::UnboundedReceiver<StabilizerEvent>,
    pub status: watch::Receiver<DetectionStatus>,
}

/// Turns successive compliance results into UI-stable signals
pub struct ViolationStabilizer {
    config: StabilizerConfig,
    manager: ViolationManager,
    events: mpsc::UnboundedSender<StabilizerEvent>,
    status: Arc<watch::Sender<DetectionStatus>>,
    stable_warnings: Arc<Mutex<Vec<ComplianceWarning>>>,
    pending_status: Option<DetectionStatus>,
    pending_warnings: Option<Vec<ComplianceWarning>>,
    status_timer: Option<JoinHandle<()>>,
    warning_timer: Option<JoinHandle<()>>,
    shut_down: bool,
}

impl ViolationStabilizer {
    pub fn new(config: StabilizerConfig) -> (Self, StabilizerOutputs) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(DetectionStatus::default());
        let cooldown = config.violation_cooldown_ms.map(Duration::from_millis);
        let manager = ViolationManager::new(cooldown);

        let stabilizer = Self {
            config,
            manager,
            events: events_tx,
            status: Arc::new(status_tx),
            stable_warnings: Arc::new(Mutex::new(Vec::new())),
            pending_status: None,
            pending_warnings: None,
            status_timer: None,
            warning_timer: None,
            shut_down: false,
        };
        let outputs = StabilizerOutputs {
            events: events_rx,
            status: status_rx,
        };
        (stabilizer, outputs)
    }

    /// Consume one tick's result. Must be called from within a tokio runtime.
    pub fn submit(&mut self, result: &ComplianceResult) {
        if self.shut_down {
            debug!("Result ignored: stabilizer shut down");
            return;
        }

        self.emit_violations(&result.warnings);
        self.schedule_status(DetectionStatus::from_result(result));
        self.schedule_warnings(&result.warnings);
    }

    /// Warning list currently considered stable
    pub fn stable_warnings(&self) -> Vec<ComplianceWarning> {
        lock(&self.stable_warnings).clone()
    }

    /// Cancel both debounce timers; nothing is delivered afterwards
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        for timer in [self.status_timer.take(), self.warning_timer.take()].into_iter().flatten() {
            timer.abort();
        }
        debug!("Stabilizer timers cancelled");
    }

    fn emit_violations(&mut self, warnings: &[ComplianceWarning]) {
        let now = Instant::now().into_std();
        for warning in warnings {
            let code = warning.code();
            if !self.manager.should_fire(code, now) {
                continue;
            }
            self.manager.record_fire(code, now);

            let record = ViolationRecord::from_warning(warning);
            debug!("Violation {} ({})", record.violation_type, record.severity.as_str());
            counter!("alerting_violations_emitted_total").increment(1);
            let _ = self.events.send(StabilizerEvent::Violation(record));
        }
    }

    fn schedule_status(&mut self, status: DetectionStatus) {
        if self.pending_status == Some(status) {
            return;
        }
        self.pending_status = Some(status);
        if let Some(timer) = self.status_timer.take() {
            timer.abort();
        }

        let delay = Duration::from_millis(self.config.status_delay_ms);
        let sender = Arc::clone(&self.status);
        self.status_timer = Some(tokio::spawn(async move {
            sleep(delay).await;
            sender.send_replace(status);
        }));
    }

    fn schedule_warnings(&mut self, warnings: &[ComplianceWarning]) {
        if self.pending_warnings.as_deref() == Some(warnings) {
            return;
        }
        self.pending_warnings = Some(warnings.to_vec());
        if let Some(timer) = self.warning_timer.take() {
            timer.abort();
        }

        let delay = Duration::from_millis(self.config.warning_settle_ms);
        let next = warnings.to_vec();
        let stable = Arc::clone(&self.stable_warnings);
        let events = self.events.clone();
        self.warning_timer = Some(tokio::spawn(async move {
            sleep(delay).await;
            let resolved = {
                let mut stable = lock(&stable);
                let was_critical = stable.iter().any(is_critical_category);
                let is_critical = next.iter().any(is_critical_category);
                *stable = next;
                was_critical && !is_critical
            };
            if resolved {
                info!("Critical violation resolved");
                counter!("alerting_violations_resolved_total").increment(1);
                let _ = events.send(StabilizerEvent::Resolved);
            }
        }));
    }
}

impl Drop for ViolationStabilizer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use compliance::ObjectCategory;

    fn result_with(warnings: Vec<ComplianceWarning>, face_count: usize) -> ComplianceResult {
        ComplianceResult {
            face_detected: face_count > 0,
            face_count,
            face_confidence: if face_count > 0 { 95.0 } else { 0.0 },
            warnings,
            ..ComplianceResult::neutral()
        }
    }

    fn drain(outputs: &mut StabilizerOutputs) -> (Vec<ViolationRecord>, usize) {
        let mut violations = Vec::new();
        let mut resolved = 0;
        while let Ok(event) = outputs.events.try_recv() {
            match event {
                StabilizerEvent::Violation(record) => violations.push(record),
                StabilizerEvent::Resolved => resolved += 1,
            }
        }
        (violations, resolved)
    }

    async fn advance_ms(ms: u64) {
        sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_absence_resolves_exactly_once() {
        let (mut stabilizer, mut outputs) = ViolationStabilizer::new(StabilizerConfig::default());

        stabilizer.submit(&result_with(vec![ComplianceWarning::NoFace], 0));
        advance_ms(1100).await;
        assert_eq!(stabilizer.stable_warnings(), vec![ComplianceWarning::NoFace]);

        for _ in 0..5 {
            stabilizer.submit(&result_with(vec![], 1));
            advance_ms(500).await;
        }

        let (violations, resolved) = drain(&mut outputs);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].violation_type, "no_face");
        assert_eq!(resolved, 1);
        assert!(stabilizer.stable_warnings().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flicker_never_settles() {
        let (mut stabilizer, mut outputs) = ViolationStabilizer::new(StabilizerConfig::default());

        stabilizer.submit(&result_with(vec![ComplianceWarning::MultipleFaces], 2));
        advance_ms(1100).await;

        // Alternates faster than the settle window
        for i in 0..6 {
            let warnings = if i % 2 == 0 { vec![] } else { vec![ComplianceWarning::MultipleFaces] };
            stabilizer.submit(&result_with(warnings, 1));
            advance_ms(400).await;
        }

        let (_, resolved) = drain(&mut outputs);
        assert_eq!(resolved, 0);
        assert_eq!(stabilizer.stable_warnings(), vec![ComplianceWarning::MultipleFaces]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_critical_clear_is_not_a_resolution() {
        let (mut stabilizer, mut outputs) = ViolationStabilizer::new(StabilizerConfig::default());

        let device = ComplianceWarning::Object(ObjectCategory::UnauthorizedDevice);
        stabilizer.submit(&result_with(vec![device, ComplianceWarning::GazeNotCentered], 1));
        advance_ms(1100).await;
        stabilizer.submit(&result_with(vec![], 1));
        advance_ms(1100).await;

        let (violations, resolved) = drain(&mut outputs);
        assert_eq!(violations.len(), 2);
        assert_eq!(resolved, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_lags_and_last_value_wins() {
        let (mut stabilizer, outputs) = ViolationStabilizer::new(StabilizerConfig::default());

        stabilizer.submit(&result_with(vec![], 1));
        advance_ms(200).await;
        stabilizer.submit(&result_with(vec![], 2));
        advance_ms(400).await;

        // First value was cancelled, second not yet due
        assert_eq!(*outputs.status.borrow(), DetectionStatus::default());

        advance_ms(200).await;
        let status = *outputs.status.borrow();
        assert_eq!(status.face_count, 2);
        assert!(status.is_detecting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_violations_emitted_every_tick() {
        let (mut stabilizer, mut outputs) = ViolationStabilizer::new(StabilizerConfig::default());
        let phone = ComplianceWarning::Object(ObjectCategory::MobilePhone);

        for _ in 0..3 {
            stabilizer.submit(&result_with(vec![phone], 1));
            advance_ms(1000).await;
        }

        let (violations, _) = drain(&mut outputs);
        assert_eq!(violations.len(), 3);
        assert!(violations.iter().all(|v| v.message == "Mobile phone detected"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_deduplicates_violations() {
        let config = StabilizerConfig {
            violation_cooldown_ms: Some(5_000),
            ..StabilizerConfig::default()
        };
        let (mut stabilizer, mut outputs) = ViolationStabilizer::new(config);
        let phone = ComplianceWarning::Object(ObjectCategory::MobilePhone);

        for _ in 0..7 {
            stabilizer.submit(&result_with(vec![phone], 1));
            advance_ms(1000).await;
        }

        // t = 0s and t = 5s
        let (violations, _) = drain(&mut outputs);
        assert_eq!(violations.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_delivered_after_shutdown() {
        let (mut stabilizer, mut outputs) = ViolationStabilizer::new(StabilizerConfig::default());

        stabilizer.submit(&result_with(vec![ComplianceWarning::NoFace], 0));
        advance_ms(1100).await;
        stabilizer.submit(&result_with(vec![], 3));
        let _ = drain(&mut outputs);

        stabilizer.shutdown();
        advance_ms(2000).await;

        let (violations, resolved) = drain(&mut outputs);
        assert!(violations.is_empty());
        assert_eq!(resolved, 0);
        assert_eq!(outputs.status.borrow().face_count, 0);

        stabilizer.submit(&result_with(vec![ComplianceWarning::NoFace], 0));
        assert!(drain(&mut outputs).0.is_empty());
    }
}
