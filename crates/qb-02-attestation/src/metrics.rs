//! # Attestation Metrics
//!
//! Prometheus metrics for claim consensus.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qb-02-attestation = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `attestation_records_total` - Attestations recorded, by outcome
//! - `attestation_claims_finalized_total` - Claims finalized
//! - `attestation_slash_points_total` - Slash points charged
//! - `attestation_vaults_slashed_total` - Vault slashing events

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Attestations recorded, labeled by outcome
    pub static ref ATTESTATION_RECORDS: IntCounterVec = register_int_counter_vec!(
        "attestation_records_total",
        "Total number of attestations recorded",
        &["outcome"]
    )
    .expect("Failed to create ATTESTATION_RECORDS metric");

    /// Claims finalized
    pub static ref CLAIMS_FINALIZED: IntCounter = register_int_counter!(
        "attestation_claims_finalized_total",
        "Total number of claims finalized"
    )
    .expect("Failed to create CLAIMS_FINALIZED metric");

    /// Slash points charged
    pub static ref SLASH_POINTS: IntCounter = register_int_counter!(
        "attestation_slash_points_total",
        "Total slash points charged"
    )
    .expect("Failed to create SLASH_POINTS metric");

    /// Vaults slashed
    pub static ref VAULTS_SLASHED: IntCounter = register_int_counter!(
        "attestation_vaults_slashed_total",
        "Total number of vault slashing events"
    )
    .expect("Failed to create VAULTS_SLASHED metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

#[cfg(feature = "metrics")]
pub fn record_attestation(outcome: &str) {
    ATTESTATION_RECORDS.with_label_values(&[outcome]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_claim_finalized() {
    CLAIMS_FINALIZED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_slash_points(points: i64) {
    if points > 0 {
        SLASH_POINTS.inc_by(points as u64);
    }
}

#[cfg(feature = "metrics")]
pub fn record_vault_slashed() {
    VAULTS_SLASHED.inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_attestation(_outcome: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_claim_finalized() {}

#[cfg(not(feature = "metrics"))]
pub fn record_slash_points(_points: i64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_vault_slashed() {}
