//! Driven ports
//!
//! Gas pricing and vault security are owned by the network manager; the
//! scheduler only consumes them.

use crate::error::OutboundResult;
use qb_01_keeper::Keeper;
use shared_types::{Asset, Chain, Coin, Vault};

/// Gas pricing for external chains.
pub trait GasManager: Send + Sync {
    /// Highest gas a vault may spend on one outbound, in the chain's gas asset.
    fn max_gas(&self, keeper: &Keeper, chain: &Chain) -> OutboundResult<Coin>;

    /// Fee rate signers should use; zero when unknown.
    fn gas_rate(&self, keeper: &Keeper, chain: &Chain) -> OutboundResult<u64>;

    /// Fee deducted from an outbound of `asset`, in that asset.
    fn outbound_fee(&self, keeper: &Keeper, asset: &Asset) -> OutboundResult<u128>;
}

/// Orders vaults by resistance to collusion.
pub trait VaultSecurityRanking: Send + Sync {
    /// Returns `vaults` sorted by ascending security: the first vault is the
    /// cheapest to corrupt, the last the most secure.
    fn rank(&self, keeper: &Keeper, vaults: Vec<Vault>) -> OutboundResult<Vec<Vault>>;
}
