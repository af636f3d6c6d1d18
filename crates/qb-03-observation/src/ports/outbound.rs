//! Driven ports
//!
//! Protocol handling of inbounds and the outbound queue both live outside
//! this crate; the pipeline only sees these traits.

use crate::error::ObservationResult;
use qb_01_keeper::Keeper;
use shared_types::{Coins, ObservedTx, TxId, TxOutItem};

/// Protocol message handling for a finalised inbound.
pub trait InboundDispatcher: Send + Sync {
    /// Turn the inbound into payment intents. An empty list means the
    /// inbound expects no outbound. An error leads to a refund.
    fn dispatch(&self, keeper: &mut Keeper, tx: &ObservedTx) -> ObservationResult<Vec<TxOutItem>>;
}

/// Result of matching a delivered outbound against the queue.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Completion {
    /// Items now carrying the delivery's OutHash.
    pub matched: Vec<TxOutItem>,
    /// Coins and gas spent beyond what matched items allowed.
    pub extra: Coins,
}

/// The outbound queue as seen from observation.
pub trait OutboundLedger: Send + Sync {
    /// Schedule a payment (refunds and dispatched intents).
    fn schedule(&self, keeper: &mut Keeper, item: TxOutItem, min_out: u128) -> ObservationResult<()>;

    /// Mark scheduled items paid by `tx`, which references `in_hash`.
    fn complete(
        &self,
        keeper: &mut Keeper,
        tx: &ObservedTx,
        in_hash: &TxId,
    ) -> ObservationResult<Completion>;
}
