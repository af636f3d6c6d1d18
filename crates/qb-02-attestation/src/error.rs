//! Error types for the attestation subsystem

use qb_01_keeper::KeeperError;
use shared_types::NodeAddress;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttestationError {
    #[error("Keeper error: {0}")]
    Keeper(#[from] KeeperError),

    /// Signer is not an active validator
    #[error("Unauthorized signer: {signer}")]
    UnauthorizedSigner { signer: NodeAddress },

    /// Claim failed validation
    #[error("Invalid claim: {reason}")]
    InvalidClaim { reason: String },
}

impl AttestationError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        AttestationError::InvalidClaim {
            reason: reason.into(),
        }
    }
}

/// Result type for attestation operations
pub type AttestationResult<T> = Result<T, AttestationError>;
