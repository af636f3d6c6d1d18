//! # Observation Metrics
//!
//! Enable with the `metrics` feature.
//!
//! - `observation_txs_total` - Observations processed, by direction
//! - `observation_consensus_total` - Consensus reached, by direction and stage
//! - `observation_inbound_dispatched_total` - Inbounds handed to protocol handling
//! - `observation_refunds_total` - Inbounds refunded

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref OBSERVATIONS: IntCounterVec = register_int_counter_vec!(
        "observation_txs_total",
        "Total observations processed",
        &["direction"]
    )
    .expect("Failed to create OBSERVATIONS metric");

    pub static ref CONSENSUS: IntCounterVec = register_int_counter_vec!(
        "observation_consensus_total",
        "Total observation consensus events",
        &["direction", "stage"]
    )
    .expect("Failed to create CONSENSUS metric");

    pub static ref DISPATCHED: IntCounter = register_int_counter!(
        "observation_inbound_dispatched_total",
        "Total inbounds dispatched"
    )
    .expect("Failed to create DISPATCHED metric");

    pub static ref REFUNDS: IntCounter = register_int_counter!(
        "observation_refunds_total",
        "Total inbounds refunded"
    )
    .expect("Failed to create REFUNDS metric");
}

#[cfg(feature = "metrics")]
pub fn record_observation(direction: &str) {
    OBSERVATIONS.with_label_values(&[direction]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_consensus(direction: &str, stage: &str) {
    CONSENSUS.with_label_values(&[direction, stage]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_dispatched() {
    DISPATCHED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_refund() {
    REFUNDS.inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_observation(_direction: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_consensus(_direction: &str, _stage: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_dispatched() {}

#[cfg(not(feature = "metrics"))]
pub fn record_refund() {}
