//! Attestation Service
//!
//! Drives a claim voter through record → consensus → finalize, with the
//! slash-point accounting shared by observation-style claims.

use crate::domain::slasher::Slasher;
use crate::domain::validator_set::ValidatorSet;
use crate::domain::voter::{AttestationVoter, RecordOutcome};
use crate::error::{AttestationError, AttestationResult};
use crate::metrics;
use crate::ports::outbound::ValidatorSetProvider;
use qb_01_keeper::Keeper;
use shared_types::{ConstantName, NodeAddress};
use std::sync::Arc;
use tracing::debug;

/// Where a claim stands after one attestation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimProgress {
    /// Signer had already attested.
    Duplicate,
    /// Payload disagrees with the canonical one.
    Conflicting,
    /// Recorded, quorum not reached yet.
    Pending,
    /// This attestation finalized the claim; run the side effect now.
    Finalized,
    /// The claim was finalized earlier; nothing to do.
    AlreadyFinalized,
}

pub struct AttestationService {
    validators: Arc<dyn ValidatorSetProvider>,
    slasher: Slasher,
}

impl AttestationService {
    pub fn new(validators: Arc<dyn ValidatorSetProvider>) -> Self {
        Self {
            validators,
            slasher: Slasher::new(),
        }
    }

    pub fn slasher(&self) -> &Slasher {
        &self.slasher
    }

    pub fn active_set(&self, keeper: &Keeper) -> AttestationResult<ValidatorSet> {
        self.validators.active_set(keeper)
    }

    /// The active set, or `UnauthorizedSigner` if `signer` is not in it.
    pub fn ensure_active(
        &self,
        keeper: &Keeper,
        signer: &NodeAddress,
    ) -> AttestationResult<ValidatorSet> {
        let active = self.active_set(keeper)?;
        if !active.contains(signer) {
            metrics::record_attestation("unauthorized");
            return Err(AttestationError::UnauthorizedSigner {
                signer: signer.clone(),
            });
        }
        Ok(active)
    }

    /// Record an attestation and finalize on first consensus. No slash
    /// points are involved.
    pub fn record_claim<P: PartialEq>(
        &self,
        keeper: &Keeper,
        voter: &mut AttestationVoter<P>,
        signer: &NodeAddress,
        payload: P,
        active: &ValidatorSet,
    ) -> ClaimProgress {
        let outcome = voter.record(signer, payload);
        metrics::record_attestation(outcome_label(outcome));
        if outcome == RecordOutcome::Conflicting {
            return ClaimProgress::Conflicting;
        }
        if voter.is_finalized() {
            return ClaimProgress::AlreadyFinalized;
        }
        if !voter.has_consensus(active) {
            if !outcome.is_new_signer() {
                return ClaimProgress::Duplicate;
            }
            debug!(
                claim = %voter.claim_id,
                signers = voter.signers.len(),
                required = active.required_weight(),
                "[qb-02] Claim pending"
            );
            return ClaimProgress::Pending;
        }
        voter.finalize(keeper.block_height());
        metrics::record_claim_finalized();
        debug!(claim = %voter.claim_id, height = keeper.block_height(), "[qb-02] Claim finalized");
        ClaimProgress::Finalized
    }

    /// Observation-style claim flow.
    ///
    /// Every attestation is charged `ObserveSlashPoints` up front. Duplicates
    /// and conflicting payloads keep the charge. On finalization all signers
    /// are refunded and absent validators pay `LackOfObservationPenalty`; a
    /// late signer within `ObservationDelayFlexibility` blocks is refunded.
    pub fn observe_claim<P: PartialEq>(
        &self,
        keeper: &mut Keeper,
        voter: &mut AttestationVoter<P>,
        signer: &NodeAddress,
        payload: P,
        active: &ValidatorSet,
    ) -> AttestationResult<ClaimProgress> {
        let observe = keeper.config_i64(ConstantName::ObserveSlashPoints)?;
        let flexibility = keeper.config_i64(ConstantName::ObservationDelayFlexibility)?;
        let height = keeper.block_height();

        self.slasher
            .inc_slash_points(keeper, observe, std::iter::once(signer))?;

        let outcome = voter.record(signer, payload);
        metrics::record_attestation(outcome_label(outcome));
        match outcome {
            RecordOutcome::Duplicate => return Ok(ClaimProgress::Duplicate),
            RecordOutcome::Conflicting => return Ok(ClaimProgress::Conflicting),
            RecordOutcome::Adopted | RecordOutcome::Added => {}
        }

        if voter.is_finalized() {
            let window_end = voter
                .finalized_height
                .saturating_add(u64::try_from(flexibility).unwrap_or(0));
            if window_end >= height {
                self.slasher
                    .dec_slash_points(keeper, observe, std::iter::once(signer))?;
            }
            return Ok(ClaimProgress::AlreadyFinalized);
        }

        if !voter.has_consensus(active) {
            debug!(
                claim = %voter.claim_id,
                signers = voter.signers.len(),
                required = active.required_weight(),
                "[qb-02] Observed claim pending"
            );
            return Ok(ClaimProgress::Pending);
        }

        voter.finalize(height);
        self.slasher
            .dec_slash_points(keeper, observe, voter.signers.iter())?;
        self.slasher
            .lack_of_observation(keeper, &voter.signers, active)?;
        metrics::record_claim_finalized();
        debug!(claim = %voter.claim_id, height, "[qb-02] Observed claim finalized");
        Ok(ClaimProgress::Finalized)
    }
}

fn outcome_label(outcome: RecordOutcome) -> &'static str {
    match outcome {
        RecordOutcome::Adopted => "adopted",
        RecordOutcome::Added => "added",
        RecordOutcome::Duplicate => "duplicate",
        RecordOutcome::Conflicting => "conflicting",
    }
}
