//! Solvency reports.
//!
//! Validators periodically report vault wallet balances. Once a report is
//! finalized the chain is halted through `SolvencyHalt{CHAIN}Chain` if the
//! vault is insolvent, and released again by a later solvent report.

use super::GovernanceService;
use crate::domain::{is_insolvent, SolvencyClaim};
use crate::error::GovernanceResult;
use crate::store;
use qb_01_keeper::Keeper;
use qb_02_attestation::{ClaimProgress, ValidatorSet};
use shared_types::{BridgeEvent, Chain, ConstantName, NodeAddress};
use tracing::{debug, error, info, warn};

const STOP_SOLVENCY_CHECK: &str = "StopSolvencyCheck";

/// Mimir key holding the height a chain was halted for insolvency.
pub fn solvency_halt_key(chain: &Chain) -> String {
    format!("SolvencyHalt{}Chain", chain)
}

impl GovernanceService {
    pub fn validate_solvency(
        &self,
        keeper: &Keeper,
        claim: &SolvencyClaim,
        signer: &NodeAddress,
    ) -> GovernanceResult<ValidatorSet> {
        claim.validate()?;
        Ok(self.attestation.ensure_active(keeper, signer)?)
    }

    pub fn handle_solvency(
        &self,
        keeper: &mut Keeper,
        claim: &SolvencyClaim,
        signer: &NodeAddress,
    ) -> GovernanceResult<ClaimProgress> {
        let active = self.validate_solvency(keeper, claim, signer)?;

        let mut voter = store::get_solvency_voter(keeper, claim)?;
        let progress =
            self.attestation
                .observe_claim(keeper, &mut voter, signer, claim.clone(), &active)?;
        store::set_solvency_voter(keeper, &voter)?;
        if progress == ClaimProgress::Finalized {
            self.apply_solvency(keeper, claim)?;
        }
        Ok(progress)
    }

    fn apply_solvency(&self, keeper: &mut Keeper, claim: &SolvencyClaim) -> GovernanceResult<()> {
        let height = i64::try_from(keeper.block_height()).unwrap_or(i64::MAX);
        let mut vault = keeper.require_vault(&claim.pub_key)?;

        let stop = keeper.get_mimir(STOP_SOLVENCY_CHECK)?;
        if stop > 0 && stop < height {
            debug!("[qb-05] Solvency checks stopped");
            return Ok(());
        }
        let stop_chain = keeper.get_mimir(&format!("{}{}", STOP_SOLVENCY_CHECK, claim.chain))?;
        if stop_chain > 0 && stop_chain < height {
            debug!(chain = %claim.chain, "[qb-05] Solvency checks stopped for chain");
            return Ok(());
        }

        let halt_key = solvency_halt_key(&claim.chain);
        let halted = keeper.get_mimir(&halt_key)?;
        // halted this block, for a future height, or by hand
        if halted >= height || halted == 1 {
            return Ok(());
        }

        let last_height = keeper.get_last_chain_height(&claim.chain)?;
        if claim.height < last_height {
            info!(
                chain = %claim.chain,
                vault = %claim.pub_key,
                report_height = claim.height,
                last_height,
                "[qb-05] Solvency report predates last observed height"
            );
            return Ok(());
        }

        let pending = self.scheduler.pending_outbounds(keeper)?;
        vault.deduct_pending_outbounds(&pending);

        let max_gas = match self.gas.max_gas(keeper, &claim.chain) {
            Ok(coin) => Some(coin.amount),
            Err(e) => {
                error!(chain = %claim.chain, error = %e, "[qb-05] Max gas unavailable");
                None
            }
        };
        let gap = u128::try_from(keeper.config_i64(ConstantName::PermittedSolvencyGap)?).unwrap_or(0);
        let insolvent = is_insolvent(&vault.coins, &claim.coins, &claim.chain, max_gas, gap);

        if insolvent && halted <= 0 {
            keeper.set_mimir(&halt_key, height)?;
            keeper.emit(BridgeEvent::SetMimir {
                key: halt_key.to_ascii_uppercase(),
                value: height,
            });
            keeper.emit(BridgeEvent::SolvencyHalt {
                chain: claim.chain.clone(),
                height: keeper.block_height(),
            });
            warn!(chain = %claim.chain, vault = %claim.pub_key, "[qb-05] Chain insolvent, halting");
        }
        if !insolvent && halted > 1 {
            keeper.set_mimir(&halt_key, 0)?;
            keeper.emit(BridgeEvent::SetMimir {
                key: halt_key.to_ascii_uppercase(),
                value: 0,
            });
            info!(chain = %claim.chain, since = halted, "[qb-05] Chain solvent again, releasing halt");
        }
        Ok(())
    }
}
