//! Node bans.
//!
//! A ban finalizes once and forces the node out at the next churn; its
//! bond is slashed by up to `BondSlashBan`.

use super::GovernanceService;
use crate::domain::BanClaim;
use crate::error::{GovernanceError, GovernanceResult};
use crate::store;
use qb_01_keeper::Keeper;
use qb_02_attestation::{ClaimProgress, ValidatorSet};
use shared_types::{BridgeEvent, ConstantName, NodeAddress, NodeStatus};
use tracing::{debug, info};

impl GovernanceService {
    /// `Ok(None)` when the target is already on its way out; there is
    /// nothing left to vote on.
    pub fn validate_ban(
        &self,
        keeper: &Keeper,
        claim: &BanClaim,
        signer: &NodeAddress,
    ) -> GovernanceResult<Option<ValidatorSet>> {
        let target = keeper
            .get_node_account(&claim.target)?
            .ok_or_else(|| GovernanceError::UnknownNode {
                node: claim.target.clone(),
            })?;
        if target.forced_to_leave {
            return Ok(None);
        }
        if !matches!(target.status, NodeStatus::Active | NodeStatus::Standby) {
            return Err(GovernanceError::NotBannable {
                node: claim.target.clone(),
                status: target.status,
            });
        }
        Ok(Some(self.attestation.ensure_active(keeper, signer)?))
    }

    pub fn handle_ban(
        &self,
        keeper: &mut Keeper,
        claim: &BanClaim,
        signer: &NodeAddress,
    ) -> GovernanceResult<ClaimProgress> {
        let Some(active) = self.validate_ban(keeper, claim, signer)? else {
            debug!(node = %claim.target, "[qb-05] Node already forced to leave");
            return Ok(ClaimProgress::AlreadyFinalized);
        };

        let mut voter = store::get_ban_voter(keeper, claim)?;
        let progress = self
            .attestation
            .record_claim(keeper, &mut voter, signer, claim.clone(), &active);
        store::set_ban_voter(keeper, &voter)?;
        if progress != ClaimProgress::Finalized {
            return Ok(progress);
        }

        let mut target = keeper
            .get_node_account(&claim.target)?
            .ok_or_else(|| GovernanceError::UnknownNode {
                node: claim.target.clone(),
            })?;
        target.forced_to_leave = true;
        target.leave_score = 1;
        keeper.set_node_account(&target)?;

        let slash = u128::try_from(keeper.config_i64(ConstantName::BondSlashBan)?).unwrap_or(0);
        let slashed = self
            .attestation
            .slasher()
            .slash_bond(keeper, &claim.target, slash)?;
        keeper.emit(BridgeEvent::BanNode {
            node: claim.target.clone(),
        });
        info!(node = %claim.target, slashed, "[qb-05] Node banned");
        Ok(progress)
    }
}
