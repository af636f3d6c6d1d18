//! Active validator set
//!
//! Every Active node carries one unit of signing weight.

use shared_types::{NodeAccount, NodeAddress};
use std::collections::BTreeSet;

/// Validators eligible to count toward quorum at one block height.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidatorSet {
    members: BTreeSet<NodeAddress>,
    height: u64,
}

impl ValidatorSet {
    pub fn new(height: u64) -> Self {
        Self {
            members: BTreeSet::new(),
            height,
        }
    }

    /// Build from node accounts, keeping only `Active` ones.
    pub fn from_nodes<'a>(height: u64, nodes: impl IntoIterator<Item = &'a NodeAccount>) -> Self {
        let mut set = Self::new(height);
        for node in nodes.into_iter().filter(|n| n.is_active()) {
            set.add_validator(node.node_address.clone());
        }
        set
    }

    pub fn add_validator(&mut self, addr: NodeAddress) {
        self.members.insert(addr);
    }

    pub fn contains(&self, addr: &NodeAddress) -> bool {
        self.members.contains(addr)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeAddress> {
        self.members.iter()
    }

    /// Total signing weight.
    pub fn total_weight(&self) -> usize {
        self.members.len()
    }

    /// Weight of the signers that are members of this set.
    pub fn weight_of<'a>(&self, signers: impl IntoIterator<Item = &'a NodeAddress>) -> usize {
        signers
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter(|s| self.contains(s))
            .count()
    }

    /// Smallest weight meeting the 2/3 threshold.
    ///
    /// Uses checked arithmetic; `ceil(2 * total / 3)`.
    pub fn required_weight(&self) -> usize {
        let total = self.total_weight();
        total
            .checked_mul(2)
            .map(|v| v.div_ceil(3))
            .unwrap_or_else(|| (total / 3).saturating_mul(2).saturating_add(1))
    }
}
