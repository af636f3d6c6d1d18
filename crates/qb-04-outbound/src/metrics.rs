//! # Outbound Metrics
//!
//! Enable with the `metrics` feature.
//!
//! - `outbound_scheduled_total` - Items appended to the queue, by path
//! - `outbound_insufficient_funds_total` - Requests no vault set could cover
//! - `outbound_completed_total` - Items marked delivered
//! - `outbound_requeued_total` - Dangling actions reassigned

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref SCHEDULED: IntCounterVec = register_int_counter_vec!(
        "outbound_scheduled_total",
        "Total outbound items scheduled",
        &["path"]
    )
    .expect("Failed to create SCHEDULED metric");

    pub static ref INSUFFICIENT_FUNDS: IntCounter = register_int_counter!(
        "outbound_insufficient_funds_total",
        "Total outbound requests rejected for insufficient vault funds"
    )
    .expect("Failed to create INSUFFICIENT_FUNDS metric");

    pub static ref COMPLETED: IntCounter = register_int_counter!(
        "outbound_completed_total",
        "Total outbound items marked delivered"
    )
    .expect("Failed to create COMPLETED metric");

    pub static ref REQUEUED: IntCounter = register_int_counter!(
        "outbound_requeued_total",
        "Total dangling actions requeued"
    )
    .expect("Failed to create REQUEUED metric");
}

#[cfg(feature = "metrics")]
pub fn record_scheduled(path: &str, count: usize) {
    SCHEDULED.with_label_values(&[path]).inc_by(count as u64);
}

#[cfg(feature = "metrics")]
pub fn record_insufficient_funds() {
    INSUFFICIENT_FUNDS.inc();
}

#[cfg(feature = "metrics")]
pub fn record_completed(count: usize) {
    COMPLETED.inc_by(count as u64);
}

#[cfg(feature = "metrics")]
pub fn record_requeued(count: usize) {
    REQUEUED.inc_by(count as u64);
}

#[cfg(not(feature = "metrics"))]
pub fn record_scheduled(_path: &str, _count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_insufficient_funds() {}

#[cfg(not(feature = "metrics"))]
pub fn record_completed(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_requeued(_count: usize) {}
