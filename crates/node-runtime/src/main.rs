//! # Bridge Node
//!
//! Entry point for the bridge node.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (`RUST_LOG`, `QB_JSON_LOGS`, ...)
//! 2. Load node configuration (`QB_*`)
//! 3. Wire the subsystem services
//! 4. Open the block file and apply blocks in order
//! 5. Stop on end of input or Ctrl+C

use anyhow::{Context, Result};
use node_runtime::{JsonLinesBlockSource, Managers, NodeConfig, NodeRuntime};
use qb_telemetry::TelemetryConfig;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = qb_telemetry::init_telemetry(TelemetryConfig::from_env())
        .context("Failed to initialize telemetry")?;

    let config = NodeConfig::from_env().context("Failed to load node configuration")?;
    info!(
        blocks_file = %config.blocks_file.display(),
        version = %config.default_version,
        "[runtime] Starting bridge node"
    );

    let runtime = NodeRuntime::new(&config, Managers::new());
    let source = JsonLinesBlockSource::open(&config.blocks_file)
        .await
        .with_context(|| format!("Failed to open block file {}", config.blocks_file.display()))?;

    tokio::select! {
        result = runtime.run(source) => {
            let blocks = result.context("Block execution failed")?;
            info!(blocks, "[runtime] All blocks applied");
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
            runtime.shutdown();
        }
    }

    match qb_telemetry::gather_text() {
        Ok(text) => tracing::debug!(metrics = %text, "[runtime] Final metrics"),
        Err(e) => tracing::warn!(error = %e, "[runtime] Metrics unavailable"),
    }
    info!("[runtime] Shutdown complete");
    Ok(())
}
