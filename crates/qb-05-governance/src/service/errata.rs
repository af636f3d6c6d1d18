//! Errata for transactions that disappeared from their chain.
//!
//! An inbound that was re-orged away is marked reverted and whatever it
//! credited to the vault is taken back. An outbound that vanished is
//! credited back to the vault that sent it, so the funds can move again.

use super::GovernanceService;
use crate::domain::ErrataClaim;
use crate::error::{GovernanceError, GovernanceResult};
use crate::store;
use qb_01_keeper::Keeper;
use qb_02_attestation::{ClaimProgress, ValidatorSet};
use qb_03_observation::store as observed;
use shared_types::{BridgeEvent, Memo, NodeAddress, VaultStatus};
use tracing::{info, warn};

impl GovernanceService {
    pub fn validate_errata(
        &self,
        keeper: &Keeper,
        claim: &ErrataClaim,
        signer: &NodeAddress,
    ) -> GovernanceResult<ValidatorSet> {
        claim.validate()?;
        Ok(self.attestation.ensure_active(keeper, signer)?)
    }

    pub fn handle_errata(
        &self,
        keeper: &mut Keeper,
        claim: &ErrataClaim,
        signer: &NodeAddress,
    ) -> GovernanceResult<ClaimProgress> {
        let active = self.validate_errata(keeper, claim, signer)?;

        let mut voter = store::get_errata_voter(keeper, claim)?;
        let progress =
            self.attestation
                .observe_claim(keeper, &mut voter, signer, claim.clone(), &active)?;
        store::set_errata_voter(keeper, &voter)?;
        if progress == ClaimProgress::Finalized {
            self.apply_errata(keeper, claim)?;
        }
        Ok(progress)
    }

    fn apply_errata(&self, keeper: &mut Keeper, claim: &ErrataClaim) -> GovernanceResult<()> {
        let mut in_voter = observed::get_in_voter(keeper, &claim.tx_id)?;
        if in_voter.txs.is_empty() {
            return self.revert_outbound(keeper, claim);
        }

        in_voter.reverted = true;
        observed::set_in_voter(keeper, &in_voter)?;
        let Some(tx) = in_voter.tx.clone() else {
            info!(tx = %claim.tx_id, "[qb-05] Errata for tx without consensus");
            return Ok(());
        };
        if tx.tx.chain != claim.chain {
            warn!(tx = %claim.tx_id, chain = %claim.chain, "[qb-05] Errata chain mismatch");
            return Ok(());
        }
        if in_voter.updated_vault && !tx.observed_pub_key.is_empty() {
            keeper.sub_vault_funds(&tx.observed_pub_key, &tx.tx.coins)?;
        }
        if !tx.is_final() {
            return Ok(());
        }

        // vault to vault movements were also observed as outbounds
        let memo = Memo::parse(&tx.tx.memo).unwrap_or(Memo::Empty);
        if matches!(memo, Memo::Migrate(_) | Memo::Ragnarok(_) | Memo::Consolidate) {
            return self.revert_outbound(keeper, claim);
        }

        keeper.emit(BridgeEvent::Errata {
            tx_id: claim.tx_id.clone(),
            chain: claim.chain.clone(),
        });
        info!(tx = %claim.tx_id, "[qb-05] Inbound reverted by errata");
        Ok(())
    }

    fn revert_outbound(&self, keeper: &mut Keeper, claim: &ErrataClaim) -> GovernanceResult<()> {
        let mut out_voter = observed::get_out_voter(keeper, &claim.tx_id)?;
        if out_voter.txs.is_empty() {
            return Err(GovernanceError::UnknownTx {
                tx_id: claim.tx_id.clone(),
            });
        }
        let Some(tx) = out_voter.tx.clone() else {
            return Err(GovernanceError::invalid(format!(
                "outbound {} has no consensus",
                claim.tx_id
            )));
        };
        let memo = Memo::parse(&tx.tx.memo)
            .map_err(|e| GovernanceError::invalid(format!("unreadable memo: {}", e)))?;
        if !memo.is_outbound_type() {
            return Err(GovernanceError::invalid(format!(
                "{} is not an outbound memo",
                tx.tx.memo
            )));
        }

        if !tx.observed_pub_key.is_empty() {
            let mut vault = keeper.require_vault(&tx.observed_pub_key)?;
            vault.add_funds(&tx.tx.coins);
            if vault.status == VaultStatus::Inactive {
                info!(vault = %vault.pub_key, "[qb-05] Errata resurrects retired vault");
                vault.status = VaultStatus::Retiring;
                keeper.emit(BridgeEvent::VaultStatusChange {
                    pub_key: vault.pub_key.clone(),
                    from: VaultStatus::Inactive,
                    to: VaultStatus::Retiring,
                });
            }
            keeper.set_vault(&vault)?;
        }

        keeper.emit(BridgeEvent::Security {
            tx_id: tx.tx.id.clone(),
            msg: "outbound errata".into(),
        });
        out_voter.reverted = true;
        observed::set_out_voter(keeper, &out_voter)?;
        keeper.emit(BridgeEvent::Errata {
            tx_id: claim.tx_id.clone(),
            chain: claim.chain.clone(),
        });
        info!(tx = %claim.tx_id, "[qb-05] Outbound reverted by errata");
        Ok(())
    }
}
