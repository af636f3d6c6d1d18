//! Ports module for the outbound scheduler

pub mod outbound;

pub use outbound::{GasManager, VaultSecurityRanking};
