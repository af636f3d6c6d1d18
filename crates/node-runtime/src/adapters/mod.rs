//! # Adapters
//!
//! Port implementations owned by the node: where blocks come from and what
//! happens to a finalised inbound.

pub mod block_source;
pub mod dispatcher;

pub use block_source::{BlockSource, JsonLinesBlockSource, VecBlockSource};
pub use dispatcher::PassthroughDispatcher;
