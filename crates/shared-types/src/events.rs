//! # Audit Events
//!
//! Fire-and-forget records emitted by handlers. They never influence
//! consensus; they are buffered per message and dropped if it fails.

use crate::common::{Chain, Coin, Coins, NodeAddress, PubKey, TxId};
use crate::entities::{TxOutItem, VaultStatus};
use serde::{Deserialize, Serialize};

/// Why bond moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BondEventKind {
    /// Fee paid for a governance vote.
    Cost,
    /// Penalty.
    Slash,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeEvent {
    SetMimir {
        key: String,
        value: i64,
    },
    SetNodeMimir {
        key: String,
        value: i64,
        signer: NodeAddress,
    },
    Bond {
        node: NodeAddress,
        amount: u128,
        kind: BondEventKind,
    },
    SlashPoints {
        node: NodeAddress,
        delta: i64,
        reason: String,
    },
    SlashVault {
        pub_key: PubKey,
        coins: Coins,
        reason: String,
    },
    Security {
        tx_id: TxId,
        msg: String,
    },
    ObservedPending {
        tx_id: TxId,
    },
    InboundDispatched {
        tx_id: TxId,
    },
    /// Coins queued back to the sender.
    Refund {
        tx_id: TxId,
        coins: Coins,
        reason: String,
    },
    /// A coin that could not be refunded. It stays in the vault.
    UnrefundableCoin {
        tx_id: TxId,
        coin: Coin,
        reason: String,
    },
    ScheduledOutbound {
        item: TxOutItem,
    },
    Fee {
        in_hash: TxId,
        coin: Coin,
    },
    Outbound {
        in_hash: TxId,
        out_tx_id: TxId,
    },
    ActionRequeued {
        in_hash: TxId,
        vault: PubKey,
    },
    Errata {
        tx_id: TxId,
        chain: Chain,
    },
    BanNode {
        node: NodeAddress,
    },
    SolvencyHalt {
        chain: Chain,
        height: u64,
    },
    VaultStatusChange {
        pub_key: PubKey,
        from: VaultStatus,
        to: VaultStatus,
    },
}

impl BridgeEvent {
    /// Stable event type name.
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeEvent::SetMimir { .. } => "set_mimir",
            BridgeEvent::SetNodeMimir { .. } => "set_node_mimir",
            BridgeEvent::Bond { .. } => "bond",
            BridgeEvent::SlashPoints { .. } => "slash_points",
            BridgeEvent::SlashVault { .. } => "slash_vault",
            BridgeEvent::Security { .. } => "security",
            BridgeEvent::ObservedPending { .. } => "pending",
            BridgeEvent::InboundDispatched { .. } => "inbound_dispatched",
            BridgeEvent::Refund { .. } => "refund",
            BridgeEvent::UnrefundableCoin { .. } => "unrefundable_coin",
            BridgeEvent::ScheduledOutbound { .. } => "scheduled_outbound",
            BridgeEvent::Fee { .. } => "fee",
            BridgeEvent::Outbound { .. } => "outbound",
            BridgeEvent::ActionRequeued { .. } => "action_requeued",
            BridgeEvent::Errata { .. } => "errata",
            BridgeEvent::BanNode { .. } => "ban_node",
            BridgeEvent::SolvencyHalt { .. } => "solvency_halt",
            BridgeEvent::VaultStatusChange { .. } => "vault_status_change",
        }
    }
}
