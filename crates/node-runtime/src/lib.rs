//! # Node Runtime Library
//!
//! The node's moving parts, exposed for the binary and for integration
//! tests.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration and the wired subsystem services
//! - `adapters/` - block sources and the inbound dispatcher
//! - `handlers/` - message type, version strategy, block executor
//! - `runtime` - the async loop feeding blocks to the executor

pub mod adapters;
pub mod container;
pub mod error;
pub mod handlers;
pub mod runtime;

pub use adapters::{BlockSource, JsonLinesBlockSource, PassthroughDispatcher, VecBlockSource};
pub use container::{Managers, ManagersBuilder, NodeConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use handlers::{
    Block, BlockExecutor, BlockReport, BridgeMsg, DeliverResult, HandlerStrategy, ProtocolVersion,
};
pub use runtime::NodeRuntime;
