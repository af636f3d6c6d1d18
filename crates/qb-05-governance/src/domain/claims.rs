//! # Claim Payloads
//!
//! The statements validators attest to. Two attestations count toward the
//! same claim only when their payloads are equal.

use crate::error::{GovernanceError, GovernanceResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::{Chain, Coins, NodeAddress, PubKey, TxId};

const MAX_MIMIR_KEY_LEN: usize = 128;

/// A validator's vote for a mimir value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimirVote {
    pub key: String,
    pub value: i64,
}

impl MimirVote {
    pub fn new(key: impl Into<String>, value: i64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Keys are ASCII letters, digits and `-`, at most 128 long.
    pub fn validate(&self) -> GovernanceResult<()> {
        if self.key.is_empty() || self.key.len() > MAX_MIMIR_KEY_LEN {
            return Err(GovernanceError::invalid(format!(
                "mimir key length {} out of range",
                self.key.len()
            )));
        }
        if !self
            .key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(GovernanceError::invalid(format!(
                "invalid mimir key: {}",
                self.key
            )));
        }
        Ok(())
    }
}

/// Request to force a misbehaving node out of the active set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanClaim {
    pub target: NodeAddress,
}

impl BanClaim {
    pub fn new(target: NodeAddress) -> Self {
        Self { target }
    }

    pub fn id(&self) -> String {
        self.target.to_string()
    }
}

/// A previously observed transaction vanished from its chain (re-org).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrataClaim {
    pub tx_id: TxId,
    pub chain: Chain,
}

impl ErrataClaim {
    pub fn new(tx_id: TxId, chain: Chain) -> Self {
        Self { tx_id, chain }
    }

    pub fn id(&self) -> String {
        format!("{}/{}", self.tx_id, self.chain)
    }

    pub fn validate(&self) -> GovernanceResult<()> {
        if self.tx_id.is_blank() {
            return Err(GovernanceError::invalid("errata needs a tx id"));
        }
        Ok(())
    }
}

/// Wallet balances a validator read for one vault on one chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolvencyClaim {
    pub chain: Chain,
    pub pub_key: PubKey,
    pub coins: Coins,
    /// External block height the balances were read at.
    pub height: u64,
}

impl SolvencyClaim {
    pub fn new(chain: Chain, pub_key: PubKey, coins: Coins, height: u64) -> Self {
        Self {
            chain,
            pub_key,
            coins,
            height,
        }
    }

    /// Hex SHA-256 over chain, vault, coins and height.
    pub fn id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.chain.as_str().as_bytes());
        hasher.update(self.pub_key.as_str().as_bytes());
        for coin in &self.coins {
            hasher.update(coin.to_string().as_bytes());
        }
        hasher.update(self.height.to_be_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn validate(&self) -> GovernanceResult<()> {
        if self.pub_key.is_empty() {
            return Err(GovernanceError::invalid("solvency report needs a vault"));
        }
        if let Some(coin) = self.coins.iter().find(|c| c.asset.chain != self.chain) {
            return Err(GovernanceError::invalid(format!(
                "coin {} is not on chain {}",
                coin, self.chain
            )));
        }
        Ok(())
    }
}
