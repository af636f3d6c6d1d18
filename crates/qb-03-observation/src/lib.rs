//! # qb-03-observation
//!
//! Consensus on transactions seen on external chains.
//!
//! ## Overview
//!
//! - **ObservedTxVoter**: one per external tx id, holding every distinct
//!   reported content with its signers. The canonical content is the one
//!   with the largest active support, recomputed on each submission.
//! - **ObservationPipeline**: ObservedTxIn credits vaults and dispatches
//!   finalised inbounds exactly once; ObservedTxOut marks scheduled
//!   outbounds delivered and slashes vaults that sent unscheduled funds.
//!
//! ```text
//!                 ┌── consensus, not final ──→ ObservedPending event
//! ObservedTxIn ───┤
//!                 └── final consensus ──→ credit vault ──→ InboundDispatcher ──→ OutboundLedger::schedule
//!
//! ObservedTxOut ──→ final consensus ──→ OutboundLedger::complete ──→ OutHash set / Slasher::slash_vault
//! ```

pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod store;

pub use domain::ObservedTxVoter;
pub use error::{ObservationError, ObservationResult};
pub use ports::{Completion, InboundDispatcher, OutboundLedger};
pub use service::{ObservationPipeline, ObservationReport};
