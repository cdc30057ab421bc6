//! Proctoring Pipeline - Main Entry Point

use proctor::{init_logging, load_config, run_simulation};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    info!("=== Proctoring Pipeline v{} ===", env!("CARGO_PKG_VERSION"));
    let config = load_config("proctor")?;

    run_simulation(&config).await?;

    Ok(())
}
