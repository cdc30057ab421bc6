//! Layered runner configuration

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use session::SessionConfig;

/// Runner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProctorConfig {
    pub session: SessionConfig,
    pub simulation: SimulationConfig,
}

/// Scripted run parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Ticks to run before stopping
    pub ticks: u32,
    pub frame_width: u32,
    pub frame_height: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks: 16,
            frame_width: 640,
            frame_height: 480,
        }
    }
}

/// Load `<name>.toml` (optional) overlaid with `PROCTOR__*` environment variables
pub fn load_config(name: &str) -> anyhow::Result<ProctorConfig> {
    let config = Config::builder()
        .add_source(File::with_name(name).required(false))
        .add_source(
            Environment::with_prefix("PROCTOR")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(config.try_deserialize()?)
}
