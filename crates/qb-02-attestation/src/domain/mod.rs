//! Domain module for the attestation subsystem
//!
//! - quorum: threshold rules
//! - voter: per-claim aggregate
//! - validator_set: the active signing set
//! - slasher: penalties

pub mod quorum;
pub mod slasher;
pub mod validator_set;
pub mod voter;
