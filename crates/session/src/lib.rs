//! Monitoring Session
//!
//! Owns everything one proctoring run needs: a fresh orchestrator, the
//! violation stabilizer, and the interval ticker driving them. Stopping a
//! session cancels every outstanding timer.

pub mod config;
pub mod session;
pub mod source;

pub use config::SessionConfig;
pub use session::{MonitoringSession, SessionOutputs};
pub use source::{FrameSource, SyntheticFrameSource};

use thiserror::Error;

/// Session error types
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid session config: {0}")]
    InvalidConfig(String),

    #[error("Session task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
