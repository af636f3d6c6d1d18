//! Vault security by member bond.

use crate::error::OutboundResult;
use crate::ports::VaultSecurityRanking;
use qb_01_keeper::Keeper;
use shared_types::{PubKey, Vault};
use std::collections::HashMap;

/// Security of a vault is the total bond of its member nodes: the value
/// that colluding members would forfeit. Ties are broken by pubkey.
#[derive(Clone, Copy, Debug, Default)]
pub struct BondSecurityRanking;

impl BondSecurityRanking {
    pub fn security(vault: &Vault, bonds: &HashMap<PubKey, u128>) -> u128 {
        vault
            .membership
            .iter()
            .map(|member| bonds.get(member).copied().unwrap_or(0))
            .fold(0u128, u128::saturating_add)
    }
}

impl VaultSecurityRanking for BondSecurityRanking {
    fn rank(&self, keeper: &Keeper, mut vaults: Vec<Vault>) -> OutboundResult<Vec<Vault>> {
        if vaults.len() < 2 {
            return Ok(vaults);
        }
        let mut bonds = HashMap::new();
        for node in keeper.node_accounts()? {
            let node = node?;
            bonds.insert(node.pub_key, node.bond);
        }
        vaults.sort_by_cached_key(|v| (Self::security(v, &bonds), v.pub_key.clone()));
        Ok(vaults)
    }
}
