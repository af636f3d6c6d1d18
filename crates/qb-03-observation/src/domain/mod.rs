//! Domain module for the observation subsystem

pub mod voter;

pub use voter::ObservedTxVoter;
