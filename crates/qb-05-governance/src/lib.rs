//! # qb-05-governance
//!
//! Claims validators make about the network itself: mimir votes, node bans,
//! errata for re-orged transactions and vault solvency reports.
//!
//! All four ride on the attestation engine. Mimir counts votes directly
//! against the operational or economic quorum; the other three finalize an
//! [`AttestationVoter`](qb_02_attestation::AttestationVoter) once and run
//! their side effect exactly then.
//!
//! ## Example
//!
//! ```rust,ignore
//! let governance = GovernanceService::new(attestation, scheduler, gas);
//! match governance.handle_mimir(&mut keeper, &MimirVote::new("HaltSigning", 1), &signer)? {
//!     MimirOutcome::Applied(value) => info!(value, "halted"),
//!     _ => {}
//! }
//! ```

pub mod domain;
pub mod error;
pub mod service;
pub mod store;

pub use domain::{is_insolvent, BanClaim, ErrataClaim, MimirVote, SolvencyClaim};
pub use error::{GovernanceError, GovernanceResult};
pub use service::{solvency_halt_key, GovernanceService, MimirOutcome};
