//! Pure outbound algorithms: vault discovery and delivery settlement.

pub mod discovery;
pub mod settlement;

pub use discovery::{discover_outbounds, usable_balance};
pub use settlement::{extra_funds, is_delivery_of};
