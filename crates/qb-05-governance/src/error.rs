//! Error types for the governance claims

use qb_01_keeper::KeeperError;
use qb_02_attestation::AttestationError;
use qb_03_observation::ObservationError;
use qb_04_outbound::OutboundError;
use shared_types::{NodeAddress, NodeStatus, TxId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("Keeper error: {0}")]
    Keeper(#[from] KeeperError),

    #[error("Attestation error: {0}")]
    Attestation(#[from] AttestationError),

    #[error("Observation error: {0}")]
    Observation(#[from] ObservationError),

    #[error("Outbound error: {0}")]
    Outbound(#[from] OutboundError),

    /// Claim failed basic validation
    #[error("Invalid claim: {reason}")]
    InvalidClaim { reason: String },

    #[error("Node account not found: {node}")]
    UnknownNode { node: NodeAddress },

    /// Only Active and Standby nodes can be banned
    #[error("Cannot ban {node} with status {status:?}")]
    NotBannable { node: NodeAddress, status: NodeStatus },

    /// Errata names a transaction nobody observed
    #[error("Cannot find observed tx: {tx_id}")]
    UnknownTx { tx_id: TxId },
}

impl GovernanceError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        GovernanceError::InvalidClaim {
            reason: reason.into(),
        }
    }
}

/// Result type for governance operations
pub type GovernanceResult<T> = Result<T, GovernanceError>;
