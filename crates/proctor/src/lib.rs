//! Proctoring Pipeline Runner
//!
//! Loads configuration, installs logging, and drives monitoring sessions
//! against scripted detector backends.

pub mod settings;
pub mod simulation;

pub use settings::{load_config, ProctorConfig, SimulationConfig};
pub use simulation::{run_simulation, SimulationSummary};

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging. `RUST_LOG` overrides the default `info` level.
pub fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
