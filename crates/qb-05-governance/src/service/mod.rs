//! # Governance Service
//!
//! Handlers for the claims validators make about the network itself rather
//! than about external transactions. Each handler is split in two steps:
//! `validate_*` only reads, the handler itself writes through the keeper's
//! open write-set.
//!
//! | Claim | Quorum | Slash points | Side effect on finalization |
//! |-------|--------|--------------|-----------------------------|
//! | Mimir | operational floor / economic 2/3 | none, bond fee | mimir value set |
//! | Ban | 2/3 | none | node forced to leave, bond slashed |
//! | ErrataTx | 2/3 | observation accounting | voter reverted, vault corrected |
//! | Solvency | 2/3 | observation accounting | chain halted or released |

mod ban;
mod errata;
mod mimir;
mod solvency;

pub use mimir::MimirOutcome;
pub use solvency::solvency_halt_key;

use qb_02_attestation::AttestationService;
use qb_04_outbound::{GasManager, OutboundScheduler};
use std::sync::Arc;

pub struct GovernanceService {
    attestation: Arc<AttestationService>,
    scheduler: Arc<OutboundScheduler>,
    gas: Arc<dyn GasManager>,
}

impl GovernanceService {
    pub fn new(
        attestation: Arc<AttestationService>,
        scheduler: Arc<OutboundScheduler>,
        gas: Arc<dyn GasManager>,
    ) -> Self {
        Self {
            attestation,
            scheduler,
            gas,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use qb_01_keeper::{InMemoryKVStore, Keeper, MemoryEventSink};
    use qb_02_attestation::KeeperValidatorProvider;
    use qb_04_outbound::{BondSecurityRanking, FixedGasManager};
    use shared_types::{
        Chain, Coin, Coins, ConstantValues, NodeAccount, NodeAddress, NodeStatus, PubKey, Vault,
        VaultStatus, ONE,
    };

    pub struct Harness {
        pub keeper: Keeper,
        pub service: GovernanceService,
    }

    pub fn btc() -> Chain {
        Chain::new("BTC").unwrap()
    }

    pub fn addr(name: &str) -> NodeAddress {
        NodeAddress::new(name)
    }

    pub fn harness() -> Harness {
        harness_with(ConstantValues::default())
    }

    /// Active nodes a, b, c bonded 10_000 ONE each, one Active vault
    /// "vault" holding 100 ONE of BTC, block height 100.
    pub fn harness_with(constants: ConstantValues) -> Harness {
        let mut keeper = Keeper::new(
            Box::new(InMemoryKVStore::new()),
            Arc::new(MemoryEventSink::new()),
            constants,
        );
        keeper.set_block_height(100);
        for name in ["a", "b", "c"] {
            keeper
                .set_node_account(&NodeAccount::new(
                    addr(name),
                    PubKey::new(&format!("pk-{}", name)),
                    NodeStatus::Active,
                    10_000 * ONE,
                ))
                .unwrap();
        }
        let mut vault = Vault::new(
            PubKey::new("vault"),
            VaultStatus::Active,
            vec![PubKey::new("pk-a"), PubKey::new("pk-b"), PubKey::new("pk-c")],
            1,
        );
        vault.add_funds(&Coins::from(Coin::new(btc().gas_asset(), 100 * ONE)));
        keeper.set_vault(&vault).unwrap();
        keeper.commit().unwrap();

        let gas = Arc::new(FixedGasManager::new(0).with_chain(btc(), 10_000, 10));
        let scheduler = Arc::new(OutboundScheduler::new(
            gas.clone(),
            Arc::new(BondSecurityRanking),
        ));
        let attestation = Arc::new(AttestationService::new(Arc::new(KeeperValidatorProvider)));
        Harness {
            keeper,
            service: GovernanceService::new(attestation, scheduler, gas),
        }
    }

    pub fn count(keeper: &Keeper, kind: &str) -> usize {
        keeper
            .pending_events()
            .iter()
            .filter(|e| e.kind() == kind)
            .count()
    }
}
