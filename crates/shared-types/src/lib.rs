//! # Shared Types Crate
//!
//! Domain records shared by the attestation, observation and outbound
//! subsystems of the bridge.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every record persisted through the keeper is
//!   defined here, so all subsystems agree on its layout.
//! - **Deterministic**: collections that are iterated during block execution
//!   are ordered (`BTreeSet`, `Vec`), never hash-ordered.
//! - **Saturating Amounts**: coin arithmetic never panics; subtraction floors
//!   at zero the way vault accounting requires.

pub mod common;
pub mod constants;
pub mod entities;
pub mod errors;
pub mod events;
pub mod memo;

pub use common::*;
pub use constants::{ConstantName, ConstantValues};
pub use entities::*;
pub use errors::{TypesError, TypesResult};
pub use events::{BondEventKind, BridgeEvent};
pub use memo::Memo;
