//! # Observation Pipeline
//!
//! Applies ObservedTxIn / ObservedTxOut attestations.
//!
//! Every observation costs the signer `ObserveSlashPoints`. Signers that
//! bring a voter to consensus get the charge back and absent validators pay
//! `LackOfObservationPenalty`; late signers of the consensus content within
//! `ObservationDelayFlexibility` blocks get both back.

use crate::domain::ObservedTxVoter;
use crate::error::{ObservationError, ObservationResult};
use crate::metrics;
use crate::ports::outbound::{InboundDispatcher, OutboundLedger};
use crate::store;
use qb_01_keeper::Keeper;
use qb_02_attestation::{AttestationService, ValidatorSet};
use shared_types::{
    BridgeEvent, Coins, ConstantName, Memo, NodeAddress, ObservedTx, TxId, TxOutItem, VaultStatus,
};
use std::iter;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    fn label(&self) -> &'static str {
        match self {
            Direction::Inbound => "in",
            Direction::Outbound => "out",
        }
    }
}

/// What one observation message did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObservationReport {
    pub processed: usize,
    /// Observations for unknown vaults.
    pub skipped: usize,
    /// Transactions that reached a consensus stage with this message.
    pub consensus: Vec<TxId>,
    /// Inbounds handed to protocol handling.
    pub dispatched: Vec<TxId>,
    /// Outbounds matched against the queue.
    pub completed: Vec<TxId>,
}

pub struct ObservationPipeline {
    attestation: Arc<AttestationService>,
    dispatcher: Arc<dyn InboundDispatcher>,
    ledger: Arc<dyn OutboundLedger>,
}

impl ObservationPipeline {
    pub fn new(
        attestation: Arc<AttestationService>,
        dispatcher: Arc<dyn InboundDispatcher>,
        ledger: Arc<dyn OutboundLedger>,
    ) -> Self {
        Self {
            attestation,
            dispatcher,
            ledger,
        }
    }

    /// Fail-fast checks; nothing is written.
    pub fn validate(
        &self,
        keeper: &Keeper,
        txs: &[ObservedTx],
        signer: &NodeAddress,
    ) -> ObservationResult<ValidatorSet> {
        if txs.is_empty() {
            return Err(ObservationError::invalid("no transactions"));
        }
        for tx in txs {
            if tx.tx.id.is_empty() {
                return Err(ObservationError::invalid("empty tx id"));
            }
            if tx.observed_pub_key.is_empty() {
                return Err(ObservationError::invalid(format!(
                    "tx {} has no observed pubkey",
                    tx.tx.id
                )));
            }
            if tx.tx.coins.is_empty() && tx.tx.gas.is_empty() {
                return Err(ObservationError::invalid(format!("tx {} moves nothing", tx.tx.id)));
            }
        }
        Ok(self.attestation.ensure_active(keeper, signer)?)
    }

    // =========================================================================
    // INBOUND
    // =========================================================================

    pub fn observed_tx_in(
        &self,
        keeper: &mut Keeper,
        txs: &[ObservedTx],
        signer: &NodeAddress,
    ) -> ObservationResult<ObservationReport> {
        let active = self.validate(keeper, txs, signer)?;
        let mut report = ObservationReport::default();

        for tx in txs {
            metrics::record_observation(Direction::Inbound.label());
            if !keeper.vault_exists(&tx.observed_pub_key)? {
                warn!(
                    tx = %tx.tx.id,
                    vault = %tx.observed_pub_key,
                    "[qb-03] Inbound to unknown vault skipped"
                );
                report.skipped += 1;
                continue;
            }

            let mut voter = store::get_in_voter(keeper, &tx.tx.id)?;
            let quorum =
                self.process_attestation(keeper, &mut voter, tx, signer, &active, Direction::Inbound)?;
            store::set_in_voter(keeper, &voter)?;
            report.processed += 1;

            if quorum {
                report.consensus.push(tx.tx.id.clone());
                if self.handle_inbound_quorum(keeper, voter, tx, &active)? {
                    report.dispatched.push(tx.tx.id.clone());
                }
            }
        }
        Ok(report)
    }

    /// Runs once per consensus stage. Credits the vault on finality and
    /// fires the dispatch gate at most once.
    fn handle_inbound_quorum(
        &self,
        keeper: &mut Keeper,
        mut voter: ObservedTxVoter,
        tx: &ObservedTx,
        active: &ValidatorSet,
    ) -> ObservationResult<bool> {
        if voter.reverted {
            info!(tx = %tx.tx.id, "[qb-03] Inbound was reverted, ignoring");
            return Ok(false);
        }
        let Some(mut vault) = keeper.get_vault(&tx.observed_pub_key)? else {
            return Ok(false);
        };

        let has_finalised = voter.has_finalised(active);
        // memo errors surface later through dispatch and end in a refund
        let memo = Memo::parse(&tx.tx.memo).ok();
        let is_migrate = matches!(memo, Some(Memo::Migrate(_)));

        if (has_finalised || is_migrate) && !voter.updated_vault {
            if tx.tx.from_address != tx.tx.to_address {
                vault.add_funds(&tx.tx.coins);
            }
            voter.updated_vault = true;
        }
        keeper.set_last_chain_height(&tx.tx.chain, tx.block_height)?;
        store::set_in_voter(keeper, &voter)?;
        keeper.set_vault(&vault)?;

        if memo.as_ref().is_some_and(|m| m.is_outbound_type()) {
            return Ok(false);
        }

        if !has_finalised {
            info!(tx = %tx.tx.id, "[qb-03] Inbound pending confirmation counting");
            metrics::record_consensus(Direction::Inbound.label(), "pending");
            keeper.emit(BridgeEvent::ObservedPending {
                tx_id: tx.tx.id.clone(),
            });
            return Ok(false);
        }
        metrics::record_consensus(Direction::Inbound.label(), "final");

        if voter.dispatched {
            return Ok(false);
        }
        let Some(canonical) = voter.tx.clone() else {
            return Ok(false);
        };
        voter.dispatched = true;
        store::set_in_voter(keeper, &voter)?;

        if vault.status == VaultStatus::Inactive {
            warn!(tx = %tx.tx.id, vault = %vault.pub_key, "[qb-03] Inbound to inactive vault");
            if self.refund(keeper, &canonical, "observed inbound tx to an inactive vault")? == 0 {
                mark_done(keeper, &tx.tx.id)?;
            }
            return Ok(false);
        }

        // payments planned by dispatch either all stand or none do
        let checkpoint = keeper.checkpoint();
        let planned = match self.dispatch_inbound(keeper, &canonical) {
            Ok(planned) => planned,
            Err(e @ ObservationError::Keeper(_)) => return Err(e),
            Err(e) => {
                warn!(tx = %tx.tx.id, error = %e, "[qb-03] Inbound handling failed, refunding");
                keeper.rollback_to(checkpoint);
                if self.refund(keeper, &canonical, &e.to_string())? == 0 {
                    mark_done(keeper, &tx.tx.id)?;
                }
                return Ok(false);
            }
        };
        if planned == 0 {
            mark_done(keeper, &tx.tx.id)?;
        }

        debug!(tx = %tx.tx.id, planned, "[qb-03] Inbound dispatched");
        metrics::record_dispatched();
        keeper.emit(BridgeEvent::InboundDispatched {
            tx_id: tx.tx.id.clone(),
        });
        Ok(true)
    }

    /// Run protocol handling and schedule every payment it asks for.
    /// Returns the number of payments planned.
    fn dispatch_inbound(&self, keeper: &mut Keeper, tx: &ObservedTx) -> ObservationResult<usize> {
        let intents = self.dispatcher.dispatch(keeper, tx)?;
        let planned = intents.len();
        for intent in intents {
            self.ledger.schedule(keeper, intent, 0)?;
        }
        Ok(planned)
    }

    /// Send every coin of the inbound back to its sender.
    ///
    /// A coin that cannot be scheduled stays in the vault and gets an
    /// `UnrefundableCoin` event. `Refund` covers only the coins queued.
    /// Returns the number of coins queued.
    fn refund(&self, keeper: &mut Keeper, tx: &ObservedTx, reason: &str) -> ObservationResult<usize> {
        let mut refunded = Coins::new();
        let mut reason = reason.to_string();

        for coin in tx.tx.coins.iter().filter(|c| !c.is_empty()) {
            let item = TxOutItem::new(
                tx.tx.chain.clone(),
                tx.tx.from_address.clone(),
                coin.clone(),
                tx.tx.id.clone(),
            )
            .with_memo(Memo::Refund(tx.tx.id.clone()).to_string());

            let checkpoint = keeper.checkpoint();
            match self.ledger.schedule(keeper, item, 0) {
                Ok(()) => refunded.add(coin),
                Err(e @ ObservationError::Keeper(_)) => return Err(e),
                Err(e) => {
                    keeper.rollback_to(checkpoint);
                    warn!(
                        tx = %tx.tx.id,
                        coin = %coin,
                        error = %e,
                        "[qb-03] Refund could not be scheduled, coin stays in vault"
                    );
                    reason = format!("{}; fail to refund ({}): {}", reason, coin, e);
                    keeper.emit(BridgeEvent::UnrefundableCoin {
                        tx_id: tx.tx.id.clone(),
                        coin: coin.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if refunded.is_empty() {
            return Ok(0);
        }
        let queued = refunded.len();
        metrics::record_refund();
        keeper.emit(BridgeEvent::Refund {
            tx_id: tx.tx.id.clone(),
            coins: refunded,
            reason,
        });
        Ok(queued)
    }

    // =========================================================================
    // OUTBOUND
    // =========================================================================

    pub fn observed_tx_out(
        &self,
        keeper: &mut Keeper,
        txs: &[ObservedTx],
        signer: &NodeAddress,
    ) -> ObservationResult<ObservationReport> {
        let active = self.validate(keeper, txs, signer)?;
        let mut report = ObservationReport::default();

        for tx in txs {
            metrics::record_observation(Direction::Outbound.label());
            if !keeper.vault_exists(&tx.observed_pub_key)? {
                warn!(
                    tx = %tx.tx.id,
                    vault = %tx.observed_pub_key,
                    "[qb-03] Outbound from unknown vault skipped"
                );
                report.skipped += 1;
                continue;
            }

            let mut voter = store::get_out_voter(keeper, &tx.tx.id)?;
            let quorum = self.process_attestation(
                keeper,
                &mut voter,
                tx,
                signer,
                &active,
                Direction::Outbound,
            )?;
            store::set_out_voter(keeper, &voter)?;
            report.processed += 1;

            if quorum {
                report.consensus.push(tx.tx.id.clone());
                if self.handle_outbound_quorum(keeper, voter, tx)? {
                    report.completed.push(tx.tx.id.clone());
                }
            }
        }
        Ok(report)
    }

    /// Cross-check a delivered outbound against the queue. Anything the
    /// queue does not account for is slashed from the sending vault.
    fn handle_outbound_quorum(
        &self,
        keeper: &mut Keeper,
        mut voter: ObservedTxVoter,
        tx: &ObservedTx,
    ) -> ObservationResult<bool> {
        let slasher = self.attestation.slasher();
        let spent = tx.tx.total_spend();

        let memo = match Memo::parse(&tx.tx.memo) {
            Ok(memo) if memo.is_outbound_type() => memo,
            _ => {
                warn!(
                    tx = %tx.tx.id,
                    memo = %tx.tx.memo,
                    "[qb-03] Vault sent funds without an outbound memo"
                );
                slasher.slash_vault(
                    keeper,
                    &tx.observed_pub_key,
                    &spent,
                    &tx.tx.id,
                    "sent_extra_funds",
                )?;
                keeper.sub_vault_funds(&tx.observed_pub_key, &spent)?;
                return Ok(false);
            }
        };

        let mut canonical = voter.tx.clone().unwrap_or_else(|| tx.clone());
        canonical.tx.memo = tx.tx.memo.clone();

        let mut completed = false;
        if memo != Memo::Consolidate {
            let in_hash = memo.in_hash().cloned().unwrap_or_else(TxId::blank);
            let completion = self.ledger.complete(keeper, &canonical, &in_hash)?;

            if !completion.extra.is_empty() {
                slasher.slash_vault(
                    keeper,
                    &tx.observed_pub_key,
                    &completion.extra,
                    &tx.tx.id,
                    "sent_extra_funds",
                )?;
            }

            if !completion.matched.is_empty() {
                completed = true;
                if !in_hash.is_blank() {
                    let mut in_voter = store::get_in_voter(keeper, &in_hash)?;
                    in_voter.add_out_tx(canonical.tx.clone());
                    store::set_in_voter(keeper, &in_voter)?;
                }
                keeper.emit(BridgeEvent::Outbound {
                    in_hash: in_hash.clone(),
                    out_tx_id: tx.tx.id.clone(),
                });
            }
        }

        voter.set_done();
        store::set_out_voter(keeper, &voter)?;

        let mut vault = keeper.require_vault(&tx.observed_pub_key)?;
        if tx.tx.from_address != tx.tx.to_address {
            vault.sub_funds(&tx.tx.coins);
        }
        vault.sub_funds(&tx.tx.gas);
        if let Memo::Migrate(height) = memo {
            vault.pending_tx_block_heights.retain(|h| *h != height);
        }
        if !vault.has_funds() && vault.status == VaultStatus::Retiring {
            info!(vault = %vault.pub_key, "[qb-03] Retiring vault drained, now inactive");
            keeper.emit(BridgeEvent::VaultStatusChange {
                pub_key: vault.pub_key.clone(),
                from: VaultStatus::Retiring,
                to: VaultStatus::Inactive,
            });
            vault.status = VaultStatus::Inactive;
        }
        // a signed outbound proves the vault can sign on this chain again
        vault.frozen.retain(|chain| chain != &tx.tx.chain);
        keeper.set_vault(&vault)?;

        metrics::record_consensus(Direction::Outbound.label(), "final");
        Ok(completed)
    }

    // =========================================================================
    // SHARED ATTESTATION FLOW
    // =========================================================================

    /// Record one attestation. Returns true when this attestation moved the
    /// voter into a consensus stage that the caller must act on.
    fn process_attestation(
        &self,
        keeper: &mut Keeper,
        voter: &mut ObservedTxVoter,
        tx: &ObservedTx,
        signer: &NodeAddress,
        active: &ValidatorSet,
        direction: Direction,
    ) -> ObservationResult<bool> {
        let slasher = self.attestation.slasher();
        let observe = keeper.config_i64(ConstantName::ObserveSlashPoints)?;
        let penalty = keeper.config_i64(ConstantName::LackOfObservationPenalty)?;
        let flexibility =
            u64::try_from(keeper.config_i64(ConstantName::ObservationDelayFlexibility)?).unwrap_or(0);
        let height = keeper.block_height();

        slasher.inc_slash_points(keeper, observe, iter::once(signer))?;
        if !voter.add(tx.clone(), signer) {
            slasher.dec_slash_points(keeper, observe, iter::once(signer))?;
            return Ok(false);
        }
        voter.refresh_canonical(active);

        let mut quorum = false;
        if voter.has_finalised(active) {
            if voter.finalised_height == 0 {
                if direction == Direction::Inbound || voter.height == 0 {
                    quorum = true;
                    voter.height = height;
                }
                voter.finalised_height = height;
                self.settle_consensus(keeper, voter, active, observe)?;
            } else if is_late_signer(voter, tx, signer, height, voter.finalised_height, flexibility) {
                voter.consensus_signers.insert(signer.clone());
                slasher.dec_slash_points(keeper, observe + penalty, iter::once(signer))?;
            }
        }

        if !quorum && voter.has_consensus(active) && !tx.is_final() && voter.finalised_height == 0 {
            if voter.height == 0 {
                quorum = true;
                voter.height = height;
                self.settle_consensus(keeper, voter, active, observe)?;
            } else if is_late_signer(voter, tx, signer, height, voter.height, flexibility) {
                voter.consensus_signers.insert(signer.clone());
                slasher.dec_slash_points(keeper, observe + penalty, iter::once(signer))?;
            }
        }
        Ok(quorum)
    }

    /// Refund the consensus signers and penalise absent validators.
    fn settle_consensus(
        &self,
        keeper: &mut Keeper,
        voter: &mut ObservedTxVoter,
        active: &ValidatorSet,
        observe: i64,
    ) -> ObservationResult<()> {
        let signers = voter
            .tx
            .as_ref()
            .map(|t| t.signers.clone())
            .unwrap_or_default();
        let slasher = self.attestation.slasher();
        slasher.dec_slash_points(keeper, observe, signers.iter())?;
        slasher.lack_of_observation(keeper, &signers, active)?;
        voter.consensus_signers = signers;
        Ok(())
    }
}

/// Close an inbound that has nothing left to pay.
fn mark_done(keeper: &mut Keeper, tx_id: &TxId) -> ObservationResult<()> {
    let mut voter = store::get_in_voter(keeper, tx_id)?;
    voter.set_done();
    store::set_in_voter(keeper, &voter)
}

/// Signed the consensus content after consensus, within the flexibility window.
fn is_late_signer(
    voter: &ObservedTxVoter,
    tx: &ObservedTx,
    signer: &NodeAddress,
    height: u64,
    consensus_height: u64,
    flexibility: u64,
) -> bool {
    let Some(canonical) = &voter.tx else {
        return false;
    };
    height <= consensus_height.saturating_add(flexibility)
        && canonical.is_final() == tx.is_final()
        && canonical.tx == tx.tx
        && !voter.consensus_signers.contains(signer)
}
