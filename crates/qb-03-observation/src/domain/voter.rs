//! # Observed Transaction Voter
//!
//! Accumulates every validator's copy of one external transaction. Distinct
//! contents are kept side by side, each with its own signers; the canonical
//! content is recomputed on every submission from current active support.
//!
//! ```text
//! Unobserved → PartiallyObserved → Consensus → Finalised → Dispatched → Done
//! ```

use qb_02_attestation::{has_consensus, ValidatorSet};
use serde::{Deserialize, Serialize};
use shared_types::{NodeAddress, ObservedTx, ObservedTxStatus, Tx, TxId, TxOutItem};
use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedTxVoter {
    pub tx_id: TxId,
    /// Canonical content; recomputed as signers arrive.
    pub tx: Option<ObservedTx>,
    /// Block height consensus was first reached.
    pub height: u64,
    pub txs: Vec<ObservedTx>,
    /// Signers whose observation charge was settled at the last consensus,
    /// plus late signers refunded since.
    pub consensus_signers: BTreeSet<NodeAddress>,
    /// Outbounds planned in response to this transaction.
    pub actions: Vec<TxOutItem>,
    /// Delivered outbounds.
    pub out_txs: Vec<Tx>,
    /// Block height a final copy reached consensus; advanced by requeue.
    pub finalised_height: u64,
    pub updated_vault: bool,
    pub reverted: bool,
    pub outbound_height: u64,
    /// Whether the inbound was handed to protocol handling.
    pub dispatched: bool,
}

impl ObservedTxVoter {
    pub fn new(tx_id: TxId) -> Self {
        Self {
            tx_id,
            tx: None,
            height: 0,
            txs: Vec::new(),
            consensus_signers: BTreeSet::new(),
            actions: Vec::new(),
            out_txs: Vec::new(),
            finalised_height: 0,
            updated_vault: false,
            reverted: false,
            outbound_height: 0,
            dispatched: false,
        }
    }

    /// Record `signer`'s copy. Returns false if this signer already signed
    /// identical content.
    pub fn add(&mut self, mut observed: ObservedTx, signer: &NodeAddress) -> bool {
        if let Some(existing) = self.txs.iter_mut().find(|t| t.same_content(&observed)) {
            return existing.sign(signer);
        }
        observed.signers.clear();
        observed.sign(signer);
        self.txs.push(observed);
        true
    }

    /// Recompute the canonical content: a final copy with consensus wins,
    /// otherwise the best-supported copy overall.
    pub fn refresh_canonical(&mut self, active: &ValidatorSet) -> Option<&ObservedTx> {
        let final_idx = self
            .select(active, true)
            .filter(|i| has_consensus(self.txs[*i].signers.iter(), active));
        let idx = final_idx.or_else(|| self.select(active, false))?;
        self.tx = Some(self.txs[idx].clone());
        self.tx.as_ref()
    }

    /// Index of the content with the largest active support. On a tie the
    /// current canonical content is kept if tied, else the earliest wins.
    fn select(&self, active: &ValidatorSet, final_only: bool) -> Option<usize> {
        let support: Vec<(usize, usize)> = self
            .txs
            .iter()
            .enumerate()
            .filter(|(_, t)| !final_only || t.is_final())
            .map(|(i, t)| (i, active.weight_of(t.signers.iter())))
            .collect();

        let top = support.iter().map(|(_, w)| *w).max()?;
        if top == 0 {
            return None;
        }
        let tied: Vec<usize> = support
            .iter()
            .filter(|(_, w)| *w == top)
            .map(|(i, _)| *i)
            .collect();

        let previous = tied.iter().copied().find(|i| {
            self.tx
                .as_ref()
                .is_some_and(|current| current.same_content(&self.txs[*i]))
        });
        previous.or_else(|| tied.first().copied())
    }

    pub fn has_consensus(&self, active: &ValidatorSet) -> bool {
        self.select(active, false)
            .is_some_and(|i| has_consensus(self.txs[i].signers.iter(), active))
    }

    /// Consensus on a copy whose external confirmation is final.
    pub fn has_finalised(&self, active: &ValidatorSet) -> bool {
        self.select(active, true)
            .is_some_and(|i| has_consensus(self.txs[i].signers.iter(), active))
    }

    pub fn add_action(&mut self, item: TxOutItem) {
        self.actions.push(item);
    }

    /// Record a delivered outbound. Returns false when it was already recorded.
    pub fn add_out_tx(&mut self, tx: Tx) -> bool {
        if self.out_txs.iter().any(|t| t.id == tx.id) {
            return false;
        }
        self.out_txs.push(tx);
        if self.out_txs.len() >= self.actions.len() {
            self.set_done();
        }
        true
    }

    pub fn set_done(&mut self) {
        for tx in self.txs.iter_mut() {
            tx.status = ObservedTxStatus::Done;
        }
        if let Some(tx) = self.tx.as_mut() {
            tx.status = ObservedTxStatus::Done;
        }
    }

    pub fn is_done(&self) -> bool {
        self.tx.as_ref().is_some_and(|t| t.is_done())
    }

    /// Indices of planned actions that no delivered outbound accounts for.
    /// Each delivery satisfies at most one action.
    pub fn dangling_actions(&self) -> Vec<usize> {
        let mut used = vec![false; self.out_txs.len()];
        let mut dangling = Vec::new();
        for (idx, action) in self.actions.iter().enumerate() {
            let hit = self
                .out_txs
                .iter()
                .enumerate()
                .find(|(j, out)| !used[*j] && action.matches_delivery(out))
                .map(|(j, _)| j);
            match hit {
                Some(j) => used[j] = true,
                None => dangling.push(idx),
            }
        }
        dangling
    }
}
