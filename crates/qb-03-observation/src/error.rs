//! Error types for the observation subsystem

use qb_01_keeper::KeeperError;
use qb_02_attestation::AttestationError;
use shared_types::PubKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObservationError {
    #[error("Keeper error: {0}")]
    Keeper(#[from] KeeperError),

    #[error("Attestation error: {0}")]
    Attestation(#[from] AttestationError),

    /// Observation failed basic validation
    #[error("Invalid observation: {reason}")]
    InvalidObservation { reason: String },

    #[error("Vault not found: {pub_key}")]
    UnknownVault { pub_key: PubKey },

    /// Outbound scheduling was rejected
    #[error("Scheduling failed: {reason}")]
    Scheduling { reason: String },

    /// Protocol handling of an inbound failed
    #[error("Dispatch failed: {reason}")]
    Dispatch { reason: String },
}

impl ObservationError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        ObservationError::InvalidObservation {
            reason: reason.into(),
        }
    }
}

/// Result type for observation operations
pub type ObservationResult<T> = Result<T, ObservationError>;
