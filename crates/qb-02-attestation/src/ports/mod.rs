//! Ports module for the attestation subsystem

pub mod outbound;

pub use outbound::ValidatorSetProvider;
