//! # qb-02-attestation
//!
//! Attestation consensus: how independently signed claims about external
//! reality converge into one finalized, idempotent fact.
//!
//! ## Overview
//!
//! - **Quorum rules**: 2/3 supermajority for standard claims, an absolute
//!   vote floor for operational mimir keys, supermajority with tie rejection
//!   for economic mimir keys.
//! - **AttestationVoter**: per-claim aggregate holding the canonical payload
//!   and the signer set; finalizes exactly once.
//! - **Slasher**: slash points, bond slashing and vault slashing.
//!
//! ```text
//! signer ──claim──→ AttestationService ──record──→ AttestationVoter<P>
//!                        │                             │
//!                        │                        has_consensus(ValidatorSet)
//!                        │                             │
//!                        └──── Slasher ←── finalize(height) once ──→ side effect
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! let service = AttestationService::new(Arc::new(KeeperValidatorProvider));
//! let active = service.ensure_active(&keeper, &signer)?;
//! let mut voter = AttestationVoter::new("claim");
//! match service.observe_claim(&mut keeper, &mut voter, &signer, payload, &active)? {
//!     ClaimProgress::Finalized => { /* run the side effect once */ }
//!     _ => {}
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{FixedValidatorProvider, KeeperValidatorProvider};
pub use domain::quorum::{
    economic_super_majority, has_consensus, has_super_majority, is_operational_key,
    operational_threshold,
};
pub use domain::slasher::Slasher;
pub use domain::validator_set::ValidatorSet;
pub use domain::voter::{AttestationVoter, RecordOutcome};
pub use error::{AttestationError, AttestationResult};
pub use ports::outbound::ValidatorSetProvider;
pub use service::{AttestationService, ClaimProgress};
