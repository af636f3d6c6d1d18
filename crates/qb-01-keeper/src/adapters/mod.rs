//! Adapters implementing the keeper ports

pub mod event_sink;
pub mod memory;
