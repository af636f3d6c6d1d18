//! Validator set providers.

use crate::domain::validator_set::ValidatorSet;
use crate::error::AttestationResult;
use crate::ports::outbound::ValidatorSetProvider;
use parking_lot::RwLock;
use qb_01_keeper::Keeper;
use shared_types::NodeAddress;
use tracing::debug;

/// Reads Active node accounts straight from the keeper.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeeperValidatorProvider;

impl ValidatorSetProvider for KeeperValidatorProvider {
    fn active_set(&self, keeper: &Keeper) -> AttestationResult<ValidatorSet> {
        let nodes = keeper.list_active_validators()?;
        let set = ValidatorSet::from_nodes(keeper.block_height(), nodes.iter());
        debug!(
            height = keeper.block_height(),
            active = set.len(),
            "[qb-02] Loaded active validator set"
        );
        Ok(set)
    }
}

/// A set fixed by the caller, replaceable at runtime.
#[derive(Default)]
pub struct FixedValidatorProvider {
    members: RwLock<Vec<NodeAddress>>,
}

impl FixedValidatorProvider {
    pub fn new(members: Vec<NodeAddress>) -> Self {
        Self {
            members: RwLock::new(members),
        }
    }

    pub fn replace(&self, members: Vec<NodeAddress>) {
        *self.members.write() = members;
    }
}

impl ValidatorSetProvider for FixedValidatorProvider {
    fn active_set(&self, keeper: &Keeper) -> AttestationResult<ValidatorSet> {
        let mut set = ValidatorSet::new(keeper.block_height());
        for member in self.members.read().iter() {
            set.add_validator(member.clone());
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qb_01_keeper::{InMemoryKVStore, MemoryEventSink};
    use shared_types::{ConstantValues, NodeAccount, NodeStatus, PubKey};
    use std::sync::Arc;

    fn keeper() -> Keeper {
        Keeper::new(
            Box::new(InMemoryKVStore::new()),
            Arc::new(MemoryEventSink::new()),
            ConstantValues::default(),
        )
    }

    #[test]
    fn test_keeper_provider_reads_active_nodes() {
        let mut keeper = keeper();
        keeper.set_block_height(42);
        for (name, status) in [("a", NodeStatus::Active), ("b", NodeStatus::Disabled)] {
            keeper
                .set_node_account(&NodeAccount::new(
                    NodeAddress::new(name),
                    PubKey::new(name),
                    status,
                    1,
                ))
                .unwrap();
        }
        let set = KeeperValidatorProvider.active_set(&keeper).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.height(), 42);
    }

    #[test]
    fn test_fixed_provider_replace() {
        let keeper = keeper();
        let provider = FixedValidatorProvider::new(vec![NodeAddress::new("a")]);
        assert_eq!(provider.active_set(&keeper).unwrap().len(), 1);
        provider.replace(vec![NodeAddress::new("a"), NodeAddress::new("b")]);
        assert_eq!(provider.active_set(&keeper).unwrap().len(), 2);
    }
}
