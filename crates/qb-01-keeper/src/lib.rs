//! # qb-01-keeper
//!
//! Storage layer for the bridge core.
//!
//! ## Overview
//!
//! - **Storage port**: `KeyValueStore`, implemented in memory for tests and
//!   by the host chain's store in production.
//! - **Write-set isolation**: every write of one message is buffered in the
//!   `Keeper` and flushed with a single atomic batch, or dropped on failure.
//! - **Typed access**: records are bincode encoded; prefix scans come back as
//!   lazy `TypedIter<T>` sequences that decode on demand.
//!
//! ```text
//! handler ──set/get──→ Keeper ──write-set──→ commit() ──atomic_batch_write──→ KeyValueStore
//!                        │
//!                        └── emit() ──buffered──→ commit() ──publish──→ EventSink
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! let sink = Arc::new(MemoryEventSink::new());
//! let mut keeper = Keeper::new(Box::new(InMemoryKVStore::new()), sink, ConstantValues::default());
//! keeper.set_block_height(10);
//! keeper.set_vault(&vault)?;
//! keeper.commit()?;
//! ```

pub mod accessors;
pub mod adapters;
pub mod error;
pub mod keeper;
pub mod keys;
pub mod ports;

pub use accessors::mimir::{NodeMimir, NodeMimirs, MIMIR_UNSET};
pub use adapters::event_sink::{MemoryEventSink, TracingEventSink};
pub use adapters::memory::InMemoryKVStore;
pub use error::{KeeperError, KeeperResult};
pub use keeper::{Checkpoint, Keeper, TypedIter};
pub use ports::events::EventSink;
pub use ports::store::{BatchOperation, KVStoreError, KeyValueStore};
