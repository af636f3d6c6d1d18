//! # Test Fixtures
//!
//! A small in-memory network: keeper, event sink and the wired services.
//! Every helper runs one message the way the block executor does
//! (`begin`, handle, `commit`), so events reach the sink and state is
//! visible to the next call.

use node_runtime::Managers;
use qb_01_keeper::{InMemoryKVStore, Keeper, MemoryEventSink};
use qb_03_observation::ObservationReport;
use qb_04_outbound::{EndBlockReport, FixedGasManager};
use qb_05_governance::{MimirOutcome, MimirVote};
use shared_types::{
    Address, Chain, Coin, Coins, ConstantValues, NodeAccount, NodeAddress, NodeStatus, ObservedTx,
    PubKey, Tx, TxId, TxOutItem, Vault, VaultStatus, ONE,
};
use std::sync::Arc;

/// Max gas the fixed gas manager quotes for BTC.
pub const BTC_MAX_GAS: u128 = 10_000;
pub const BTC_GAS_RATE: u64 = 10;

pub fn btc() -> Chain {
    Chain::new("BTC").unwrap()
}

pub fn btc_coin(amount: u128) -> Coin {
    Coin::new(btc().gas_asset(), amount)
}

pub fn addr(name: &str) -> NodeAddress {
    NodeAddress::new(name)
}

/// Public key of node `name`.
pub fn node_key(name: &str) -> PubKey {
    PubKey::new(&format!("pk-{}", name))
}

pub struct Network {
    pub keeper: Keeper,
    pub events: Arc<MemoryEventSink>,
    pub managers: Managers,
}

impl Network {
    /// Active nodes a, b, c bonded 1_000 ONE each, no vaults, zero outbound
    /// fee, block height 1.
    pub fn new() -> Self {
        Self::with_constants(ConstantValues::default())
    }

    pub fn with_constants(constants: ConstantValues) -> Self {
        Self::with_fee(constants, 0)
    }

    /// Like [`Network::new`] but every outbound pays `fee`.
    pub fn with_outbound_fee(fee: u128) -> Self {
        Self::with_fee(ConstantValues::default(), fee)
    }

    fn with_fee(constants: ConstantValues, fee: u128) -> Self {
        let managers = Managers::builder()
            .gas(Arc::new(
                FixedGasManager::new(fee).with_chain(btc(), BTC_MAX_GAS, BTC_GAS_RATE),
            ))
            .build();
        Self::with_managers(constants, managers)
    }

    pub fn with_managers(constants: ConstantValues, managers: Managers) -> Self {
        let events = Arc::new(MemoryEventSink::new());
        let mut keeper = Keeper::new(Box::new(InMemoryKVStore::new()), events.clone(), constants);
        keeper.set_block_height(1);
        let mut network = Self {
            keeper,
            events,
            managers,
        };
        for name in ["a", "b", "c"] {
            network.add_node(name, 1_000 * ONE);
        }
        network
    }

    pub fn add_node(&mut self, name: &str, bond: u128) {
        self.keeper
            .set_node_account(&NodeAccount::new(
                addr(name),
                node_key(name),
                NodeStatus::Active,
                bond,
            ))
            .unwrap();
        self.keeper.commit().unwrap();
    }

    /// A vault whose members are the named nodes, holding `amount` BTC.
    pub fn add_vault(&mut self, key: &str, status: VaultStatus, members: &[&str], amount: u128) {
        let mut vault = Vault::new(
            PubKey::new(key),
            status,
            members.iter().map(|m| node_key(m)).collect(),
            1,
        );
        if amount > 0 {
            vault.add_funds(&Coins::from(btc_coin(amount)));
        }
        self.keeper.set_vault(&vault).unwrap();
        self.keeper.commit().unwrap();
    }

    pub fn vault(&self, key: &str) -> Vault {
        self.keeper.require_vault(&PubKey::new(key)).unwrap()
    }

    pub fn at(&mut self, height: u64) {
        self.keeper.set_block_height(height);
    }

    pub fn height(&self) -> u64 {
        self.keeper.block_height()
    }

    // =========================================================================
    // MESSAGES
    // =========================================================================

    /// Each signer reports `tx` once, in order.
    pub fn observe_in(&mut self, tx: &ObservedTx, signers: &[&str]) -> Vec<ObservationReport> {
        let pipeline = self.managers.observation.clone();
        signers
            .iter()
            .map(|s| {
                self.keeper.begin();
                let report = pipeline
                    .observed_tx_in(&mut self.keeper, std::slice::from_ref(tx), &addr(s))
                    .unwrap();
                self.keeper.commit().unwrap();
                report
            })
            .collect()
    }

    pub fn observe_out(&mut self, tx: &ObservedTx, signers: &[&str]) -> Vec<ObservationReport> {
        let pipeline = self.managers.observation.clone();
        signers
            .iter()
            .map(|s| {
                self.keeper.begin();
                let report = pipeline
                    .observed_tx_out(&mut self.keeper, std::slice::from_ref(tx), &addr(s))
                    .unwrap();
                self.keeper.commit().unwrap();
                report
            })
            .collect()
    }

    pub fn vote_mimir(&mut self, key: &str, value: i64, signer: &str) -> MimirOutcome {
        self.keeper.begin();
        let outcome = self
            .managers
            .governance
            .handle_mimir(&mut self.keeper, &MimirVote::new(key, value), &addr(signer))
            .unwrap();
        self.keeper.commit().unwrap();
        outcome
    }

    /// Schedule one payment through discovery and commit it.
    pub fn schedule(&mut self, item: TxOutItem) -> Vec<TxOutItem> {
        self.keeper.begin();
        let scheduled = self
            .managers
            .scheduler
            .schedule_outbound(&mut self.keeper, item, 0)
            .unwrap();
        self.keeper.commit().unwrap();
        scheduled
    }

    pub fn end_block(&mut self) -> EndBlockReport {
        self.keeper.begin();
        let report = self.managers.scheduler.end_block(&mut self.keeper).unwrap();
        self.keeper.commit().unwrap();
        report
    }

    /// Every queued item with its bucket height, lowest height first.
    pub fn queued(&self) -> Vec<(u64, TxOutItem)> {
        let mut items = Vec::new();
        for bucket in self.keeper.tx_out_buckets().unwrap() {
            let bucket = bucket.unwrap();
            items.extend(bucket.tx_array.into_iter().map(|i| (bucket.height, i)));
        }
        items
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

/// A user deposit of `amount` BTC into vault `vault`, final at height 10.
pub fn inbound(id: &str, vault: &str, amount: u128, memo: &str) -> ObservedTx {
    let tx = Tx {
        id: TxId::new(id),
        chain: btc(),
        from_address: Address::new("bc1user"),
        to_address: PubKey::new(vault).address(&btc()),
        coins: Coins::from(btc_coin(amount)),
        gas: Coins::new(),
        memo: memo.to_string(),
    };
    ObservedTx::new(tx, 10, PubKey::new(vault), 10)
}

/// The vault's signed payment of `item`, spending `gas` on top.
pub fn delivery_of(id: &str, item: &TxOutItem, gas: u128) -> ObservedTx {
    let vault = item.vault_pub_key.clone().unwrap();
    let gas = if gas == 0 {
        Coins::new()
    } else {
        Coins::from(btc_coin(gas))
    };
    let tx = Tx {
        id: TxId::new(id),
        chain: item.chain.clone(),
        from_address: vault.address(&item.chain),
        to_address: item.to_address.clone(),
        coins: Coins::from(item.coin.clone()),
        gas,
        memo: item.memo.clone(),
    };
    ObservedTx::new(tx, 20, vault, 20)
}

/// A BTC payment request for `in_hash`, left to vault discovery.
pub fn payment(to: &str, amount: u128, in_hash: &str) -> TxOutItem {
    TxOutItem::new(btc(), Address::new(to), btc_coin(amount), TxId::new(in_hash))
}
