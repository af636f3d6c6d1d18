//! # Mimir
//!
//! Admin-set keys and per-node votes. A key that was never set reads as
//! [`MIMIR_UNSET`]; values below zero are treated the same way.

use crate::error::KeeperResult;
use crate::keeper::Keeper;
use crate::keys;
use serde::{Deserialize, Serialize};
use shared_types::{ConstantName, NodeAddress};

pub const MIMIR_UNSET: i64 = -1;

/// One validator's vote on a mimir key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMimir {
    pub signer: NodeAddress,
    pub value: i64,
}

/// All votes cast on a single key, at most one per signer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMimirs {
    pub key: String,
    pub votes: Vec<NodeMimir>,
}

impl NodeMimirs {
    pub fn new(key: &str) -> Self {
        Self {
            key: normalize(key),
            votes: Vec::new(),
        }
    }

    /// Record or overwrite the signer's vote.
    pub fn set(&mut self, signer: &NodeAddress, value: i64) {
        match self.votes.iter_mut().find(|v| &v.signer == signer) {
            Some(vote) => vote.value = value,
            None => self.votes.push(NodeMimir {
                signer: signer.clone(),
                value,
            }),
        }
    }

    pub fn vote_of(&self, signer: &NodeAddress) -> Option<i64> {
        self.votes
            .iter()
            .find(|v| &v.signer == signer)
            .map(|v| v.value)
    }
}

fn normalize(key: &str) -> String {
    key.to_ascii_uppercase()
}

impl Keeper {
    pub fn get_mimir(&self, key: &str) -> KeeperResult<i64> {
        Ok(self
            .get(&keys::key(keys::MIMIR, &normalize(key)))?
            .unwrap_or(MIMIR_UNSET))
    }

    pub fn set_mimir(&mut self, key: &str, value: i64) -> KeeperResult<()> {
        self.set(keys::key(keys::MIMIR, &normalize(key)), &value)
    }

    pub fn delete_mimir(&mut self, key: &str) {
        self.delete(keys::key(keys::MIMIR, &normalize(key)));
    }

    pub fn get_node_mimirs(&self, key: &str) -> KeeperResult<NodeMimirs> {
        Ok(self
            .get(&keys::key(keys::NODE_MIMIR, &normalize(key)))?
            .unwrap_or_else(|| NodeMimirs::new(key)))
    }

    pub fn set_node_mimir(&mut self, key: &str, value: i64, signer: &NodeAddress) -> KeeperResult<()> {
        let mut mimirs = self.get_node_mimirs(key)?;
        mimirs.set(signer, value);
        self.set(keys::key(keys::NODE_MIMIR, &mimirs.key), &mimirs)
    }

    /// Delete the node votes of every key for which `select` holds.
    /// Returns the number of keys purged.
    pub fn purge_node_mimirs<F>(&mut self, select: F) -> KeeperResult<usize>
    where
        F: Fn(&str) -> bool,
    {
        let mut doomed = Vec::new();
        for mimirs in self.iter::<NodeMimirs>(keys::NODE_MIMIR)? {
            let mimirs = mimirs?;
            if select(&mimirs.key) {
                doomed.push(mimirs.key);
            }
        }
        let count = doomed.len();
        for key in doomed {
            self.delete(keys::key(keys::NODE_MIMIR, &key));
        }
        Ok(count)
    }

    /// Effective value of a protocol constant: a mimir override when one is
    /// set (`>= 0`), the compiled default otherwise.
    pub fn config_i64(&self, name: ConstantName) -> KeeperResult<i64> {
        let value = self.get_mimir(name.key())?;
        if value >= 0 {
            return Ok(value);
        }
        Ok(self.constants().get(name))
    }
}
