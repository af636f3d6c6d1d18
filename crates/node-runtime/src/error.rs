//! Runtime errors.

use qb_01_keeper::KeeperError;
use qb_03_observation::ObservationError;
use qb_04_outbound::OutboundError;
use qb_05_governance::GovernanceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Keeper error: {0}")]
    Keeper(#[from] KeeperError),

    #[error("Observation error: {0}")]
    Observation(#[from] ObservationError),

    #[error("Outbound error: {0}")]
    Outbound(#[from] OutboundError),

    #[error("Governance error: {0}")]
    Governance(#[from] GovernanceError),

    #[error("Invalid protocol version: {0}")]
    InvalidVersion(String),

    #[error("Protocol version {version} is below the minimum {minimum}")]
    UnsupportedVersion { version: String, minimum: String },

    #[error("Block {got} does not follow block {last}")]
    BlockOutOfOrder { last: u64, got: u64 },

    #[error("No block is open")]
    NoOpenBlock,

    #[error("Block source error: {0}")]
    Source(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
