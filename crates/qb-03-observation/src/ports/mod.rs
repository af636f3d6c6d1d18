//! Ports module for the observation subsystem

pub mod outbound;

pub use outbound::{Completion, InboundDispatcher, OutboundLedger};
