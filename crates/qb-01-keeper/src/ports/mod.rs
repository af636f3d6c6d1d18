//! Ports (hexagonal architecture)
//!
//! Driven ports the host application implements for the keeper.

pub mod events;
pub mod store;
