//! Scripted monitoring run
//!
//! Plays a fixed exam scenario through a real session: an attentive
//! start, a long glance away, the test-taker leaving, a second person
//! appearing, then a primary detector outage handled by the fallback
//! backend while a phone is on the desk.

use std::sync::Arc;

use alerting::StabilizerEvent;
use compliance::BackendPair;
use detector_backend::{
    DetectorError, ObjectDetection, ScriptedBackend, ScriptedResponse, SyntheticFace,
};
use session::{MonitoringSession, SessionOutputs, SyntheticFrameSource};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::settings::ProctorConfig;

/// What a run produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationSummary {
    pub results: usize,
    pub violations: usize,
    pub resolutions: usize,
}

/// Backends replaying the scripted scenario
pub fn scripted_backends() -> BackendPair {
    let frontal = SyntheticFace::frontal();
    let glancing = SyntheticFace::frontal().yaw(0.4);
    let second_person = SyntheticFace::frontal().at(480.0, 220.0).score(0.8);

    let mut primary = ScriptedBackend::new("primary");
    let script = [
        vec![frontal.detection()],
        vec![frontal.detection()],
        vec![glancing.detection()],
        vec![glancing.detection()],
        vec![glancing.detection()],
        vec![glancing.detection()],
        vec![glancing.detection()],
        vec![frontal.detection()],
        vec![],
        vec![],
        vec![frontal.detection()],
        vec![frontal.detection()],
        vec![frontal.detection(), second_person.detection()],
    ];
    for faces in script {
        primary = primary.then_faces(ScriptedResponse::Reply(faces));
    }
    let primary = primary.then_faces(ScriptedResponse::Fail(DetectorError::Unavailable(
        "inference worker crashed".into(),
    )));

    let fallback = ScriptedBackend::new("fallback")
        .with_faces(vec![frontal.detection()])
        .with_objects(vec![ObjectDetection::new("cell phone", 0.9)]);

    BackendPair::new(Arc::new(primary)).with_fallback(Arc::new(fallback))
}

/// Run the scripted scenario for the configured number of ticks
pub async fn run_simulation(config: &ProctorConfig) -> anyhow::Result<SimulationSummary> {
    let source = Arc::new(SyntheticFrameSource::new(
        config.simulation.frame_width,
        config.simulation.frame_height,
    ));
    let (session, outputs) =
        MonitoringSession::start(config.session.clone(), scripted_backends(), source)?;
    info!("Simulating {} ticks in session {}", config.simulation.ticks, session.id());

    let reporter = tokio::spawn(report(outputs));

    let run_for = config.session.tick_interval() * config.simulation.ticks.saturating_sub(1)
        + config.session.tick_interval() / 2;
    sleep(run_for).await;
    session.stop().await?;

    let summary = reporter.await?;
    info!(
        "Simulation finished: {} results, {} violations, {} resolutions",
        summary.results, summary.violations, summary.resolutions
    );
    Ok(summary)
}

async fn report(mut outputs: SessionOutputs) -> SimulationSummary {
    let mut summary = SimulationSummary::default();
    let mut results_open = true;
    let mut events_open = true;

    while results_open || events_open {
        tokio::select! {
            result = outputs.results.recv(), if results_open => match result {
                Some(result) => {
                    summary.results += 1;
                    info!(
                        "Tick {}: faces={} gaze={:?} attention={:.0} away={:.1}s warnings={:?}",
                        summary.results,
                        result.face_count,
                        result.gaze_direction,
                        result.attention_score,
                        result.looking_away_duration,
                        result.warning_messages()
                    );
                    match serde_json::to_string(&result) {
                        Ok(json) => debug!("Result: {}", json),
                        Err(e) => warn!("Failed to serialize result: {}", e),
                    }
                }
                None => results_open = false,
            },
            event = outputs.events.recv(), if events_open => match event {
                Some(StabilizerEvent::Violation(record)) => {
                    summary.violations += 1;
                    warn!("Violation [{}] {}", record.severity.as_str(), record.message);
                }
                Some(StabilizerEvent::Resolved) => {
                    summary.resolutions += 1;
                    info!("Violation resolved");
                }
                None => events_open = false,
            },
        }
    }

    let status = *outputs.status.borrow();
    info!(
        "Final status: faces={} confidence={:.0} detecting={}",
        status.face_count, status.confidence, status.is_detecting
    );
    summary
}
