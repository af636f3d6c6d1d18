//! Claim payloads and pure checks.

pub mod claims;
pub mod solvency;

pub use claims::{BanClaim, ErrataClaim, MimirVote, SolvencyClaim};
pub use solvency::is_insolvent;
