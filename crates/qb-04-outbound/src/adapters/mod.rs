//! Adapters for the outbound ports

pub mod gas;
pub mod security;

pub use gas::{FixedGasManager, NetworkFeeGasManager};
pub use security::BondSecurityRanking;
