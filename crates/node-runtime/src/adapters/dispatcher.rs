//! Minimal protocol handling for finalised inbounds.
//!
//! The node carries no pools, so an inbound either forwards its coins
//! (`SEND:<address>`), is kept as a donation (empty memo), or fails and
//! is refunded by the pipeline.

use qb_01_keeper::Keeper;
use qb_03_observation::{InboundDispatcher, ObservationError, ObservationResult};
use shared_types::{Address, Memo, ObservedTx, TxOutItem};
use tracing::debug;

const SEND_PREFIX: &str = "SEND:";

#[derive(Clone, Copy, Debug, Default)]
pub struct PassthroughDispatcher;

impl InboundDispatcher for PassthroughDispatcher {
    fn dispatch(&self, _keeper: &mut Keeper, tx: &ObservedTx) -> ObservationResult<Vec<TxOutItem>> {
        let memo = Memo::parse(&tx.tx.memo).map_err(|e| ObservationError::Dispatch {
            reason: e.to_string(),
        })?;
        let body = match memo {
            Memo::Empty => return Ok(Vec::new()),
            Memo::Inbound(body) => body,
            other => {
                return Err(ObservationError::Dispatch {
                    reason: format!("unexpected memo {}", other),
                })
            }
        };

        let destination = match body.get(..SEND_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(SEND_PREFIX) => body[SEND_PREFIX.len()..].trim(),
            _ => {
                return Err(ObservationError::Dispatch {
                    reason: format!("unsupported memo: {}", body),
                })
            }
        };
        if destination.is_empty() {
            return Err(ObservationError::Dispatch {
                reason: "missing destination".into(),
            });
        }

        let to = Address::new(destination);
        let items: Vec<TxOutItem> = tx
            .tx
            .coins
            .iter()
            .filter(|coin| !coin.is_empty())
            .map(|coin| TxOutItem::new(tx.tx.chain.clone(), to.clone(), coin.clone(), tx.tx.id.clone()))
            .collect();
        debug!(tx = %tx.tx.id, to = %to, items = items.len(), "[runtime] Forwarding inbound");
        Ok(items)
    }
}
