//! Reserve, chain heights and network fees.

use crate::error::KeeperResult;
use crate::keeper::Keeper;
use crate::keys;
use shared_types::{Chain, NetworkFee};

impl Keeper {
    pub fn get_reserve(&self) -> KeeperResult<u128> {
        Ok(self.get(keys::RESERVE.as_bytes())?.unwrap_or(0))
    }

    pub fn add_to_reserve(&mut self, amount: u128) -> KeeperResult<()> {
        let total = self.get_reserve()?.saturating_add(amount);
        self.set(keys::RESERVE.as_bytes().to_vec(), &total)
    }

    /// Highest external block height observed for `chain`.
    pub fn get_last_chain_height(&self, chain: &Chain) -> KeeperResult<u64> {
        Ok(self
            .get(&keys::key(keys::LAST_CHAIN_HEIGHT, chain.as_str()))?
            .unwrap_or(0))
    }

    /// Only ever moves forward. Returns whether the height changed.
    pub fn set_last_chain_height(&mut self, chain: &Chain, height: u64) -> KeeperResult<bool> {
        if height <= self.get_last_chain_height(chain)? {
            return Ok(false);
        }
        self.set(keys::key(keys::LAST_CHAIN_HEIGHT, chain.as_str()), &height)?;
        Ok(true)
    }

    pub fn get_network_fee(&self, chain: &Chain) -> KeeperResult<Option<NetworkFee>> {
        self.get(&keys::key(keys::NETWORK_FEE, chain.as_str()))
    }

    pub fn set_network_fee(&mut self, fee: &NetworkFee) -> KeeperResult<()> {
        self.set(keys::key(keys::NETWORK_FEE, fee.chain.as_str()), fee)
    }
}
