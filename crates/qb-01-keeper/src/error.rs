//! Error types for the keeper

use crate::ports::store::KVStoreError;
use thiserror::Error;

/// Keeper errors
#[derive(Debug, Error)]
pub enum KeeperError {
    /// Underlying store failed
    #[error("Store error: {0}")]
    Store(#[from] KVStoreError),

    /// Record could not be encoded or decoded
    #[error("Codec error for key {key}: {reason}")]
    Codec { key: String, reason: String },

    /// Required record is missing
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

impl KeeperError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        KeeperError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Result type for keeper operations
pub type KeeperResult<T> = Result<T, KeeperError>;
