//! # Attestation Voter
//!
//! Per-claim aggregate. The first accepted payload becomes canonical; later
//! submissions either add their signer or are ignored as conflicting.
//! Finalization happens exactly once.

use crate::domain::quorum;
use crate::domain::validator_set::ValidatorSet;
use serde::{Deserialize, Serialize};
use shared_types::NodeAddress;
use std::collections::BTreeSet;
use tracing::warn;

/// What a call to [`AttestationVoter::record`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordOutcome {
    /// First submission; payload became canonical.
    Adopted,
    /// Matching payload from a new signer.
    Added,
    /// Matching payload from a signer already recorded.
    Duplicate,
    /// Payload differs from the canonical one; nothing changed.
    Conflicting,
}

impl RecordOutcome {
    /// Whether the signer set grew.
    pub fn is_new_signer(&self) -> bool {
        matches!(self, RecordOutcome::Adopted | RecordOutcome::Added)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationVoter<P> {
    pub claim_id: String,
    pub canonical: Option<P>,
    pub signers: BTreeSet<NodeAddress>,
    /// Zero until finalized.
    pub finalized_height: u64,
    pub done: bool,
}

impl<P: PartialEq> AttestationVoter<P> {
    pub fn new(claim_id: impl Into<String>) -> Self {
        Self {
            claim_id: claim_id.into(),
            canonical: None,
            signers: BTreeSet::new(),
            finalized_height: 0,
            done: false,
        }
    }

    pub fn record(&mut self, signer: &NodeAddress, payload: P) -> RecordOutcome {
        match &self.canonical {
            None => {
                self.canonical = Some(payload);
                self.signers.insert(signer.clone());
                RecordOutcome::Adopted
            }
            Some(canonical) if *canonical == payload => {
                if self.signers.insert(signer.clone()) {
                    RecordOutcome::Added
                } else {
                    RecordOutcome::Duplicate
                }
            }
            Some(_) => {
                warn!(
                    claim = %self.claim_id,
                    signer = %signer,
                    "[qb-02] Conflicting attestation ignored"
                );
                RecordOutcome::Conflicting
            }
        }
    }

    pub fn has_signed(&self, signer: &NodeAddress) -> bool {
        self.signers.contains(signer)
    }

    pub fn has_consensus(&self, active: &ValidatorSet) -> bool {
        self.canonical.is_some() && quorum::has_consensus(self.signers.iter(), active)
    }

    /// Marks the voter done at `height`. Returns true only on the first call,
    /// which is the caller's cue to run the claim's side effect.
    pub fn finalize(&mut self, height: u64) -> bool {
        if self.done {
            return false;
        }
        if self.finalized_height == 0 {
            self.finalized_height = height;
        }
        self.done = true;
        true
    }

    pub fn is_finalized(&self) -> bool {
        self.done
    }
}
