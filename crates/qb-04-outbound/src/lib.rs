//! # qb-04-outbound
//!
//! The outbound settlement scheduler: turns finalized payment intents into
//! per-height queues of payments from custodial vaults.
//!
//! ## Overview
//!
//! - **Discovery**: a request is split greedily over Active then Retiring
//!   vaults, each ordered by ascending security, after deducting what those
//!   vaults already owe. A shortfall is an error, never an under-payment.
//! - **Settlement**: delivered outbounds set the item's OutHash; spending
//!   beyond the queued amount plus max gas is reported as extra funds.
//! - **Recovery**: actions still undelivered a signing period after their
//!   inbound finalised move to the most secure Active vault.
//!
//! ## Example
//!
//! ```rust,ignore
//! let scheduler = OutboundScheduler::new(
//!     Arc::new(NetworkFeeGasManager),
//!     Arc::new(BondSecurityRanking),
//! );
//! let queued = scheduler.schedule_outbound(&mut keeper, item, min_out)?;
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{BondSecurityRanking, FixedGasManager, NetworkFeeGasManager};
pub use domain::{discover_outbounds, extra_funds, is_delivery_of, usable_balance};
pub use error::{OutboundError, OutboundResult};
pub use ports::{GasManager, VaultSecurityRanking};
pub use service::{EndBlockReport, OutboundScheduler};
