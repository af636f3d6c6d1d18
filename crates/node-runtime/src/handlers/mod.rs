//! # Handlers
//!
//! Message routing: the message sum type, the per-block version strategy
//! and the executor that applies both to the keeper.

pub mod executor;
pub mod msg;
pub mod strategy;

pub use executor::{BlockExecutor, BlockReport, DeliverResult};
pub use msg::{Block, BridgeMsg};
pub use strategy::{HandlerStrategy, ProtocolVersion};
