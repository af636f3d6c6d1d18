//! # Error Types
//!
//! Parse and validation errors for shared value objects.

use thiserror::Error;

/// Errors raised while building shared value objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    /// Chain symbol is empty or not alphanumeric.
    #[error("Invalid chain: {0}")]
    InvalidChain(String),

    /// Asset is not of the form `CHAIN.SYMBOL`.
    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

    /// Memo could not be parsed for its declared type.
    #[error("Invalid memo: {0}")]
    InvalidMemo(String),
}

/// Result alias for shared value object construction.
pub type TypesResult<T> = Result<T, TypesError>;
