//! Node-level Prometheus metrics.
//!
//! All metrics live in the default registry, next to the per-subsystem
//! ones registered by the library crates, so one [`gather_text`] call
//! exports everything.
//!
//! - `bridge_blocks_applied_total` - Blocks applied
//! - `bridge_block_height` - Height of the last applied block
//! - `bridge_messages_total` - Messages delivered, by kind and outcome
//! - `bridge_block_apply_duration_seconds` - Time to apply one block

use crate::TelemetryError;
use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, register_histogram, register_int_counter, register_int_counter_vec,
    register_int_gauge, Encoder, Histogram, IntCounter, IntCounterVec, IntGauge, TextEncoder,
};
use std::time::Instant;

lazy_static! {
    pub static ref BLOCKS_APPLIED: IntCounter = register_int_counter!(
        "bridge_blocks_applied_total",
        "Total number of blocks applied"
    )
    .expect("Failed to create BLOCKS_APPLIED metric");

    pub static ref BLOCK_HEIGHT: IntGauge = register_int_gauge!(
        "bridge_block_height",
        "Height of the last applied block"
    )
    .expect("Failed to create BLOCK_HEIGHT metric");

    pub static ref MESSAGES: IntCounterVec = register_int_counter_vec!(
        "bridge_messages_total",
        "Total messages delivered, by kind and outcome",
        &["kind", "outcome"]
    )
    .expect("Failed to create MESSAGES metric");

    pub static ref BLOCK_APPLY_DURATION: Histogram = register_histogram!(
        "bridge_block_apply_duration_seconds",
        "Time spent applying one block",
        exponential_buckets(0.0005, 2.0, 14).expect("valid bucket layout")
    )
    .expect("Failed to create BLOCK_APPLY_DURATION metric");
}

/// Force registration so the series show up before the first block.
pub fn register_metrics() {
    lazy_static::initialize(&BLOCKS_APPLIED);
    lazy_static::initialize(&BLOCK_HEIGHT);
    lazy_static::initialize(&MESSAGES);
    lazy_static::initialize(&BLOCK_APPLY_DURATION);
}

pub fn record_block_applied(height: u64) {
    BLOCKS_APPLIED.inc();
    BLOCK_HEIGHT.set(i64::try_from(height).unwrap_or(i64::MAX));
}

pub fn record_message(kind: &str, outcome: &str) {
    MESSAGES.with_label_values(&[kind, outcome]).inc();
}

/// Observes the elapsed time into a histogram when dropped.
pub struct HistogramTimer {
    histogram: Histogram,
    start: Instant,
}

impl HistogramTimer {
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

pub fn block_timer() -> HistogramTimer {
    HistogramTimer::new(&BLOCK_APPLY_DURATION)
}

/// Every registered metric in the Prometheus text format.
pub fn gather_text() -> Result<String, TelemetryError> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| TelemetryError::MetricsEncode(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsEncode(e.to_string()))
}
