//! # Messages
//!
//! Everything a block can carry, as one closed sum type. Blocks arrive as
//! JSON, one per line:
//!
//! ```text
//! {"height":101,"version":"3.0.0","msgs":[
//!   {"type":"mimir","key":"HaltSigning","value":1,"signer":"node-a"},
//!   {"type":"ban","node":"node-c","signer":"node-a"}
//! ]}
//! ```

use crate::handlers::strategy::ProtocolVersion;
use qb_05_governance::{BanClaim, ErrataClaim, SolvencyClaim};
use serde::{Deserialize, Serialize};
use shared_types::{Chain, Coins, NodeAddress, ObservedTx, PubKey, TxId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeMsg {
    ObservedTxIn {
        txs: Vec<ObservedTx>,
        signer: NodeAddress,
    },
    ObservedTxOut {
        txs: Vec<ObservedTx>,
        signer: NodeAddress,
    },
    Mimir {
        key: String,
        value: i64,
        signer: NodeAddress,
    },
    Ban {
        node: NodeAddress,
        signer: NodeAddress,
    },
    ErrataTx {
        tx_id: TxId,
        chain: Chain,
        signer: NodeAddress,
    },
    Solvency {
        chain: Chain,
        pub_key: PubKey,
        coins: Coins,
        height: u64,
        signer: NodeAddress,
    },
}

impl BridgeMsg {
    /// Label used in logs and the `kind` metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeMsg::ObservedTxIn { .. } => "observed_tx_in",
            BridgeMsg::ObservedTxOut { .. } => "observed_tx_out",
            BridgeMsg::Mimir { .. } => "mimir",
            BridgeMsg::Ban { .. } => "ban",
            BridgeMsg::ErrataTx { .. } => "errata_tx",
            BridgeMsg::Solvency { .. } => "solvency",
        }
    }

    pub fn signer(&self) -> &NodeAddress {
        match self {
            BridgeMsg::ObservedTxIn { signer, .. }
            | BridgeMsg::ObservedTxOut { signer, .. }
            | BridgeMsg::Mimir { signer, .. }
            | BridgeMsg::Ban { signer, .. }
            | BridgeMsg::ErrataTx { signer, .. }
            | BridgeMsg::Solvency { signer, .. } => signer,
        }
    }

    pub fn mimir(key: &str, value: i64, signer: NodeAddress) -> Self {
        BridgeMsg::Mimir {
            key: key.to_string(),
            value,
            signer,
        }
    }

    pub fn ban(claim: BanClaim, signer: NodeAddress) -> Self {
        BridgeMsg::Ban {
            node: claim.target,
            signer,
        }
    }

    pub fn errata(claim: ErrataClaim, signer: NodeAddress) -> Self {
        BridgeMsg::ErrataTx {
            tx_id: claim.tx_id,
            chain: claim.chain,
            signer,
        }
    }

    pub fn solvency(claim: SolvencyClaim, signer: NodeAddress) -> Self {
        BridgeMsg::Solvency {
            chain: claim.chain,
            pub_key: claim.pub_key,
            coins: claim.coins,
            height: claim.height,
            signer,
        }
    }
}

/// One block: a height, the protocol version it was produced under and its
/// messages in delivery order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub height: u64,
    #[serde(default)]
    pub version: Option<ProtocolVersion>,
    #[serde(default)]
    pub msgs: Vec<BridgeMsg>,
}

impl Block {
    pub fn new(height: u64, msgs: Vec<BridgeMsg>) -> Self {
        Self {
            height,
            version: None,
            msgs,
        }
    }

    pub fn with_version(mut self, version: ProtocolVersion) -> Self {
        self.version = Some(version);
        self
    }
}
