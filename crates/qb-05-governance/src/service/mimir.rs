//! Node mimir votes.
//!
//! Every vote costs the signer `NativeTransactionFee` of bond, paid into the
//! reserve. Operational keys take effect once `OperationalVotesMin` active
//! nodes agree; every other key needs a 2/3 supermajority.

use super::GovernanceService;
use crate::domain::MimirVote;
use crate::error::GovernanceResult;
use qb_01_keeper::Keeper;
use qb_02_attestation::{
    economic_super_majority, is_operational_key, operational_threshold, ValidatorSet,
};
use shared_types::{BondEventKind, BridgeEvent, ConstantName, NodeAddress};
use tracing::{debug, info};

/// Result of one mimir vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MimirOutcome {
    /// Vote stored; the key did not change.
    Recorded,
    /// The voted value is already the stored value.
    Unchanged,
    /// The vote moved the key to this value.
    Applied(i64),
}

impl GovernanceService {
    pub fn validate_mimir(
        &self,
        keeper: &Keeper,
        vote: &MimirVote,
        signer: &NodeAddress,
    ) -> GovernanceResult<ValidatorSet> {
        vote.validate()?;
        Ok(self.attestation.ensure_active(keeper, signer)?)
    }

    pub fn handle_mimir(
        &self,
        keeper: &mut Keeper,
        vote: &MimirVote,
        signer: &NodeAddress,
    ) -> GovernanceResult<MimirOutcome> {
        let active = self.validate_mimir(keeper, vote, signer)?;

        let fee = u128::try_from(keeper.config_i64(ConstantName::NativeTransactionFee)?).unwrap_or(0);
        let paid = keeper.send_bond_to_reserve(signer, fee)?;
        keeper.set_node_mimir(&vote.key, vote.value, signer)?;
        keeper.emit(BridgeEvent::SetNodeMimir {
            key: vote.key.to_ascii_uppercase(),
            value: vote.value,
            signer: signer.clone(),
        });
        keeper.emit(BridgeEvent::Bond {
            node: signer.clone(),
            amount: paid,
            kind: BondEventKind::Cost,
        });

        let current = keeper.get_mimir(&vote.key)?;
        if vote.value == current {
            debug!(key = %vote.key, value = current, "[qb-05] Mimir vote matches current value");
            return Ok(MimirOutcome::Unchanged);
        }

        let mimirs = keeper.get_node_mimirs(&vote.key)?;
        let votes = mimirs.votes.iter().map(|v| (&v.signer, v.value));
        let effective = if is_operational_key(&vote.key) {
            let min_votes = keeper.config_i64(ConstantName::OperationalVotesMin)?;
            operational_threshold(votes, &active, min_votes)
        } else {
            economic_super_majority(votes, &active)
        };

        match effective {
            Some(value) if value >= 0 && value != current && value == vote.value => {
                keeper.set_mimir(&vote.key, value)?;
                keeper.emit(BridgeEvent::SetMimir {
                    key: vote.key.to_ascii_uppercase(),
                    value,
                });
                info!(key = %vote.key, value, "[qb-05] Mimir set by node vote");
                Ok(MimirOutcome::Applied(value))
            }
            _ => Ok(MimirOutcome::Recorded),
        }
    }

    /// Drop node votes on operational keys. Runs on churn so a new active
    /// set starts from a clean slate.
    pub fn purge_operational_votes(&self, keeper: &mut Keeper) -> GovernanceResult<usize> {
        let purged = keeper.purge_node_mimirs(is_operational_key)?;
        if purged > 0 {
            info!(keys = purged, "[qb-05] Purged operational mimir votes");
        }
        Ok(purged)
    }
}
