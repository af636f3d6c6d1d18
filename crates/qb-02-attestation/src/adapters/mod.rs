//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implementations of the validator set port.

mod validator_provider;

pub use validator_provider::{FixedValidatorProvider, KeeperValidatorProvider};
