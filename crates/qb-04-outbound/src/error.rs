//! Error types for the outbound scheduler

use qb_01_keeper::KeeperError;
use qb_03_observation::ObservationError;
use shared_types::{Asset, Chain};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutboundError {
    #[error("Keeper error: {0}")]
    Keeper(#[from] KeeperError),

    #[error("Observation error: {0}")]
    Observation(#[from] ObservationError),

    /// Item rejected before vault discovery
    #[error("Invalid outbound: {reason}")]
    InvalidItem { reason: String },

    /// Vaults could not cover the request
    #[error("Insufficient funds for outbound: {remainder} {asset} remaining")]
    InsufficientFunds { asset: Asset, remainder: u128 },

    /// Sum of outputs after fees is below the caller's floor
    #[error("Outbound amount does not meet requirements ({amount}/{min_out})")]
    BelowMinimum { amount: u128, min_out: u128 },

    #[error("Not enough to pay the outbound fee")]
    NotEnoughToPayFee,

    #[error("No gas pricing for chain {chain}")]
    GasUnavailable { chain: Chain },
}

impl OutboundError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        OutboundError::InvalidItem {
            reason: reason.into(),
        }
    }
}

impl From<OutboundError> for ObservationError {
    fn from(err: OutboundError) -> Self {
        match err {
            OutboundError::Observation(inner) => inner,
            OutboundError::Keeper(inner) => ObservationError::Keeper(inner),
            other => ObservationError::Scheduling {
                reason: other.to_string(),
            },
        }
    }
}

/// Result type for outbound operations
pub type OutboundResult<T> = Result<T, OutboundError>;
