//! # qb-telemetry
//!
//! Observability bootstrap for the bridge node.
//!
//! - **Logs**: `tracing-subscriber` with an `EnvFilter`, pretty or JSON.
//! - **Metrics**: Prometheus default registry, node-level series here and
//!   subsystem series in the library crates (`metrics` feature).
//!
//! ## Usage
//!
//! ```rust,ignore
//! let _guard = qb_telemetry::init_telemetry(TelemetryConfig::from_env())?;
//! // ...
//! println!("{}", qb_telemetry::gather_text()?);
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RUST_LOG` / `QB_LOG_LEVEL` | `info` | Log filter |
//! | `QB_JSON_LOGS` | `false` | JSON log lines |
//! | `QB_LOG_TARGET` | `false` | Show module targets |
//! | `QB_SERVICE_NAME` | `quorum-bridge` | Service name |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{gather_text, register_metrics};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to encode metrics: {0}")]
    MetricsEncode(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install logging and register node metrics.
///
/// Returns a guard to hold for the lifetime of the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics();
    init_logging(&config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Logs shutdown when dropped.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}
