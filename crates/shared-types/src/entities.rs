//! # Domain Entities
//!
//! Records persisted by the keeper: node accounts, vaults, observed
//! transactions and the outbound queue.

use crate::common::{Address, Asset, Chain, Coin, Coins, NodeAddress, PubKey, Tx, TxId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// NODE ACCOUNTS
// =============================================================================

/// Lifecycle status of a validator. Only `Active` counts toward quorum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeStatus {
    #[default]
    Unknown,
    WhiteListed,
    Standby,
    Ready,
    Active,
    Disabled,
}

/// A party that posted bond on behalf of a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondProvider {
    pub address: NodeAddress,
    pub bond: u128,
}

/// Validator account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAccount {
    pub node_address: NodeAddress,
    /// Key used in vault membership.
    pub pub_key: PubKey,
    pub status: NodeStatus,
    pub bond: u128,
    pub bond_providers: Vec<BondProvider>,
    pub leave_score: u64,
    pub forced_to_leave: bool,
    pub requested_to_leave: bool,
    pub maintenance: bool,
    pub slash_points: i64,
    pub version: String,
    pub ip_address: String,
    pub active_block_height: u64,
}

impl NodeAccount {
    pub fn new(node_address: NodeAddress, pub_key: PubKey, status: NodeStatus, bond: u128) -> Self {
        Self {
            node_address,
            pub_key,
            status,
            bond,
            bond_providers: Vec::new(),
            leave_score: 0,
            forced_to_leave: false,
            requested_to_leave: false,
            maintenance: false,
            slash_points: 0,
            version: String::new(),
            ip_address: String::new(),
            active_block_height: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == NodeStatus::Active
    }
}

// =============================================================================
// VAULTS
// =============================================================================

/// Custody lifecycle. Vaults are never deleted, only retired.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VaultStatus {
    #[default]
    Active,
    Retiring,
    Inactive,
}

/// Multi-party custody address on the external chains.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    pub pub_key: PubKey,
    pub status: VaultStatus,
    /// Member node pubkeys.
    pub membership: Vec<PubKey>,
    pub coins: Coins,
    pub pending_tx_block_heights: Vec<u64>,
    pub chains: Vec<Chain>,
    /// Chains on which no new outbound may be assigned.
    pub frozen: Vec<Chain>,
    pub block_height: u64,
}

impl Vault {
    pub fn new(pub_key: PubKey, status: VaultStatus, membership: Vec<PubKey>, block_height: u64) -> Self {
        Self {
            pub_key,
            status,
            membership,
            coins: Coins::new(),
            pending_tx_block_heights: Vec::new(),
            chains: Vec::new(),
            frozen: Vec::new(),
            block_height,
        }
    }

    pub fn coin(&self, asset: &Asset) -> u128 {
        self.coins.get(asset)
    }

    pub fn add_funds(&mut self, coins: &Coins) {
        self.coins.add_all(coins);
    }

    pub fn sub_funds(&mut self, coins: &Coins) {
        self.coins.sub_all(coins);
    }

    pub fn has_funds(&self) -> bool {
        !self.coins.is_empty()
    }

    pub fn is_frozen(&self, chain: &Chain) -> bool {
        self.frozen.contains(chain)
    }

    pub fn address(&self, chain: &Chain) -> Address {
        self.pub_key.address(chain)
    }

    /// Remove the value of outbounds already assigned to this vault but not
    /// yet delivered, coin plus reserved max gas.
    pub fn deduct_pending_outbounds(&mut self, pending: &[TxOutItem]) {
        for item in pending {
            if item.vault_pub_key.as_ref() != Some(&self.pub_key) {
                continue;
            }
            self.coins.sub(&item.coin);
            self.coins.sub_all(&item.max_gas);
        }
    }
}

// =============================================================================
// OBSERVATIONS
// =============================================================================

/// Whether every planned outbound of an observation has been delivered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservedTxStatus {
    #[default]
    Incomplete,
    Done,
}

/// One validator's report of an external transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedTx {
    pub tx: Tx,
    pub status: ObservedTxStatus,
    pub out_hashes: Vec<TxId>,
    /// External block height the tx was seen in.
    pub block_height: u64,
    /// External height past which the tx is irreversible.
    pub finalise_height: u64,
    pub observed_pub_key: PubKey,
    pub signers: BTreeSet<NodeAddress>,
    pub keysign_ms: i64,
}

impl ObservedTx {
    pub fn new(tx: Tx, block_height: u64, observed_pub_key: PubKey, finalise_height: u64) -> Self {
        Self {
            tx,
            status: ObservedTxStatus::Incomplete,
            out_hashes: Vec::new(),
            block_height,
            finalise_height,
            observed_pub_key,
            signers: BTreeSet::new(),
            keysign_ms: 0,
        }
    }

    pub fn is_final(&self) -> bool {
        self.block_height >= self.finalise_height
    }

    /// Equality of reported content, ignoring who signed it.
    pub fn same_content(&self, other: &ObservedTx) -> bool {
        self.tx == other.tx
            && self.block_height == other.block_height
            && self.finalise_height == other.finalise_height
            && self.observed_pub_key == other.observed_pub_key
    }

    /// Returns false if the signer was already present.
    pub fn sign(&mut self, signer: &NodeAddress) -> bool {
        self.signers.insert(signer.clone())
    }

    pub fn has_signed(&self, signer: &NodeAddress) -> bool {
        self.signers.contains(signer)
    }

    pub fn is_done(&self) -> bool {
        self.status == ObservedTxStatus::Done
    }
}

// =============================================================================
// OUTBOUND QUEUE
// =============================================================================

/// A scheduled payment instructing a vault to send funds out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutItem {
    pub chain: Chain,
    pub to_address: Address,
    /// Unset until vault discovery assigns a funding vault.
    pub vault_pub_key: Option<PubKey>,
    pub coin: Coin,
    pub memo: String,
    pub max_gas: Coins,
    pub gas_rate: u64,
    pub in_hash: TxId,
    /// Set once the payment is observed as delivered; terminal.
    pub out_hash: Option<TxId>,
    pub clout_spent: u128,
}

impl TxOutItem {
    pub fn new(chain: Chain, to_address: Address, coin: Coin, in_hash: TxId) -> Self {
        Self {
            chain,
            to_address,
            vault_pub_key: None,
            coin,
            memo: String::new(),
            max_gas: Coins::new(),
            gas_rate: 0,
            in_hash,
            out_hash: None,
            clout_spent: 0,
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn with_vault(mut self, vault: PubKey) -> Self {
        self.vault_pub_key = Some(vault);
        self
    }

    pub fn is_pending(&self) -> bool {
        self.out_hash.is_none()
    }

    /// Whether a delivered tx accounts for this item: same memo, destination,
    /// chain and coin. A gas-asset item also matches when coin plus gas spent
    /// equals coin plus max gas planned.
    pub fn matches_delivery(&self, delivered: &Tx) -> bool {
        let mut coin_matches = delivered.coins.contains(&self.coin);
        if !coin_matches && self.coin.asset == self.chain.gas_asset() {
            let gas_asset = self.chain.gas_asset();
            let intended = self.coin.amount.saturating_add(self.max_gas.get(&gas_asset));
            let actual = delivered
                .coins
                .get(&gas_asset)
                .saturating_add(delivered.gas.get(&gas_asset));
            coin_matches = intended == actual;
        }
        coin_matches
            && self.memo.eq_ignore_ascii_case(&delivered.memo)
            && self.to_address == delivered.to_address
            && self.chain == delivered.chain
    }
}

/// One block height's outbound bucket.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    pub height: u64,
    pub tx_array: Vec<TxOutItem>,
}

impl TxOut {
    pub fn new(height: u64) -> Self {
        Self {
            height,
            tx_array: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tx_array.is_empty()
    }
}

/// Gas pricing reported for a chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkFee {
    pub chain: Chain,
    pub transaction_size: u64,
    pub transaction_fee_rate: u64,
}
