//! Outbound buckets keyed by block height.

use crate::error::KeeperResult;
use crate::keeper::{Keeper, TypedIter};
use crate::keys;
use shared_types::{TxOut, TxOutItem};

impl Keeper {
    /// Bucket at `height`; empty when nothing was scheduled there.
    pub fn get_tx_out(&self, height: u64) -> KeeperResult<TxOut> {
        Ok(self
            .get(&keys::height_key(keys::TX_OUT, height))?
            .unwrap_or_else(|| TxOut::new(height)))
    }

    pub fn set_tx_out(&mut self, tx_out: &TxOut) -> KeeperResult<()> {
        self.set(keys::height_key(keys::TX_OUT, tx_out.height), tx_out)
    }

    pub fn append_tx_out(&mut self, height: u64, item: TxOutItem) -> KeeperResult<()> {
        let mut bucket = self.get_tx_out(height)?;
        bucket.tx_array.push(item);
        self.set_tx_out(&bucket)
    }

    /// Every stored bucket in ascending height order.
    pub fn tx_out_buckets(&self) -> KeeperResult<TypedIter<TxOut>> {
        self.iter(keys::TX_OUT)
    }
}
