//! # Outbound Scheduler
//!
//! Turns payment intents into per-height TxOut buckets, keeps the queue in
//! step with deliveries, and rescues actions whose vault never signed.
//!
//! ```text
//! schedule_outbound ──→ discover vaults ──→ fees / min_out ──→ bucket[h + delay]
//!                                                         └──→ in-voter actions
//! complete_outbound ←── ObservedTxOut consensus        (sets OutHash, reports extra)
//! end_block ──→ gas refresh of bucket[h] ──→ requeue_dangling(find_dangling())
//! ```

use crate::domain::{discover_outbounds, extra_funds, is_delivery_of};
use crate::error::{OutboundError, OutboundResult};
use crate::metrics;
use crate::ports::{GasManager, VaultSecurityRanking};
use qb_01_keeper::Keeper;
use qb_03_observation::{store, Completion, ObservationResult, OutboundLedger};
use shared_types::{
    BridgeEvent, Chain, Coin, Coins, ConstantName, Memo, ObservedTx, TxId, TxOut, TxOutItem, Vault,
    VaultStatus,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What one end-block pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndBlockReport {
    pub gas_refreshed: usize,
    pub requeued: usize,
}

pub struct OutboundScheduler {
    gas: Arc<dyn GasManager>,
    ranking: Arc<dyn VaultSecurityRanking>,
}

impl OutboundScheduler {
    pub fn new(gas: Arc<dyn GasManager>, ranking: Arc<dyn VaultSecurityRanking>) -> Self {
        Self { gas, ranking }
    }

    pub fn get_outbound_bucket(&self, keeper: &Keeper, height: u64) -> OutboundResult<TxOut> {
        Ok(keeper.get_tx_out(height)?)
    }

    /// Every queued item not yet delivered, across all buckets.
    pub fn pending_outbounds(&self, keeper: &Keeper) -> OutboundResult<Vec<TxOutItem>> {
        let mut pending = Vec::new();
        for bucket in keeper.tx_out_buckets()? {
            pending.extend(bucket?.tx_array.into_iter().filter(TxOutItem::is_pending));
        }
        Ok(pending)
    }

    /// Active then Retiring vaults, each ascending by security, with the
    /// value of their undelivered outbounds deducted.
    pub fn candidate_vaults(&self, keeper: &Keeper) -> OutboundResult<Vec<Vault>> {
        let pending = self.pending_outbounds(keeper)?;
        let mut candidates = Vec::new();
        for status in [VaultStatus::Active, VaultStatus::Retiring] {
            let ranked = self.ranking.rank(keeper, keeper.vaults_by_status(status)?)?;
            for mut vault in ranked {
                vault.deduct_pending_outbounds(&pending);
                candidates.push(vault);
            }
        }
        Ok(candidates)
    }

    // =========================================================================
    // SCHEDULING
    // =========================================================================

    /// Validate, fund and enqueue a payment. Returns the items actually
    /// queued. Nothing is written when an error is returned.
    pub fn schedule_outbound(
        &self,
        keeper: &mut Keeper,
        mut item: TxOutItem,
        min_out: u128,
    ) -> OutboundResult<Vec<TxOutItem>> {
        if item.to_address.is_noop() {
            debug!(in_hash = %item.in_hash, "[qb-04] Noop destination, nothing scheduled");
            return Ok(Vec::new());
        }
        if item.to_address.is_empty() {
            return Err(OutboundError::invalid("empty to address, can't send out"));
        }
        if item.in_hash.is_empty() {
            item.in_hash = TxId::blank();
        }
        if item.memo.is_empty() {
            item.memo = Memo::Outbound(item.in_hash.clone()).to_string();
        }

        let fee = self.gas.outbound_fee(keeper, &item.coin.asset)?;
        let max_gas = self.gas.max_gas(keeper, &item.chain)?;
        let gas_rate = self.gas.gas_rate(keeper, &item.chain)?;

        let (outputs, path) = if item.vault_pub_key.is_some() {
            (vec![item.clone()], "preselected")
        } else {
            let candidates = self.candidate_vaults(keeper)?;
            let (outputs, remainder) = discover_outbounds(fee, &max_gas, &item, &candidates);
            if remainder > 0 {
                metrics::record_insufficient_funds();
                warn!(
                    in_hash = %item.in_hash,
                    to = %item.to_address,
                    remainder,
                    "[qb-04] Insufficient vault funds for outbound"
                );
                return Err(OutboundError::InsufficientFunds {
                    asset: item.coin.asset.clone(),
                    remainder,
                });
            }
            (outputs, "discovered")
        };

        let memo = Memo::parse(&item.memo).ok();
        let fee_exempt = memo.as_ref().is_some_and(Memo::is_fee_exempt);
        let ragnarok = matches!(memo, Some(Memo::Ragnarok(_)));

        let mut fee_events = Vec::new();
        let mut scheduled = Vec::with_capacity(outputs.len());
        for mut output in outputs {
            if output.max_gas.is_empty() {
                output.max_gas = Coins::from(max_gas.clone());
                output.gas_rate = gas_rate;
            }
            if !fee_exempt {
                let taken = fee.min(output.coin.amount);
                output.coin.amount -= taken;
                if taken > 0 {
                    fee_events.push(BridgeEvent::Fee {
                        in_hash: output.in_hash.clone(),
                        coin: Coin::new(output.coin.asset.clone(), taken),
                    });
                }
            }
            // ragnarok payouts carry their own gas
            if ragnarok && output.coin.asset.is_gas_asset() {
                let gas = output.max_gas.get(&output.coin.asset);
                output.coin.amount = output.coin.amount.saturating_sub(gas);
            }
            if output.coin.is_empty() {
                info!(in_hash = %output.in_hash, "[qb-04] Output consumed by fees, dropped");
                continue;
            }
            scheduled.push(output);
        }

        if scheduled.is_empty() {
            return Err(OutboundError::NotEnoughToPayFee);
        }
        let total = scheduled
            .iter()
            .map(|o| o.coin.amount)
            .fold(0u128, u128::saturating_add);
        if total < min_out {
            return Err(OutboundError::BelowMinimum {
                amount: total,
                min_out,
            });
        }

        let height = keeper.block_height();
        let delay = u64::try_from(keeper.config_i64(ConstantName::TxOutDelayBlocks)?).unwrap_or(0);
        let outbound_height = height.saturating_add(delay);

        if !item.in_hash.is_blank() {
            let mut voter = store::get_in_voter(keeper, &item.in_hash)?;
            voter.finalised_height = height;
            voter.outbound_height = voter.outbound_height.max(outbound_height);
            for output in &scheduled {
                voter.add_action(output.clone());
            }
            store::set_in_voter(keeper, &voter)?;
        }

        for output in &scheduled {
            keeper.append_tx_out(outbound_height, output.clone())?;
            keeper.emit(BridgeEvent::ScheduledOutbound {
                item: output.clone(),
            });
        }
        for event in fee_events {
            keeper.emit(event);
        }

        info!(
            in_hash = %item.in_hash,
            outputs = scheduled.len(),
            amount = total,
            height = outbound_height,
            "[qb-04] Outbound scheduled"
        );
        metrics::record_scheduled(path, scheduled.len());
        Ok(scheduled)
    }

    /// Enqueue `item` at `height` as is: no discovery, no fee, no voter
    /// bookkeeping. For migrations and recovery paths.
    pub fn unsafe_add_tx_out_item(
        &self,
        keeper: &mut Keeper,
        item: TxOutItem,
        height: u64,
    ) -> OutboundResult<()> {
        if item.to_address.is_noop() {
            return Ok(());
        }
        if item.to_address.is_empty() {
            return Err(OutboundError::invalid("empty to address, can't send out"));
        }
        keeper.append_tx_out(height, item.clone())?;
        keeper.emit(BridgeEvent::ScheduledOutbound { item });
        metrics::record_scheduled("unsafe", 1);
        Ok(())
    }

    // =========================================================================
    // SETTLEMENT
    // =========================================================================

    /// Mark queued items paid by `tx` and report what it spent beyond them.
    ///
    /// Each delivered coin pays at most one item. Buckets are scanned from
    /// the inbound's finalised height on, or entirely when there is no
    /// inbound (migrations).
    pub fn complete_outbound(
        &self,
        keeper: &mut Keeper,
        tx: &ObservedTx,
        in_hash: &TxId,
    ) -> OutboundResult<Completion> {
        let height = keeper.block_height();
        let (from, to) = match store::find_in_voter(keeper, in_hash)? {
            Some(voter) if !in_hash.is_blank() && voter.finalised_height > 0 => {
                (voter.finalised_height, height.max(voter.outbound_height))
            }
            _ => (0, u64::MAX),
        };

        let mut unpaid: Vec<&Coin> = tx.tx.coins.iter().filter(|c| !c.is_empty()).collect();
        let mut matched = Vec::new();
        let mut allowed = Coins::new();
        let mut touched = Vec::new();

        for bucket in keeper.tx_out_buckets()? {
            if unpaid.is_empty() {
                break;
            }
            let mut bucket = bucket?;
            if bucket.height < from || bucket.height > to {
                continue;
            }
            let mut changed = false;
            for item in bucket.tx_array.iter_mut() {
                if !is_delivery_of(item, tx, in_hash) {
                    continue;
                }
                let Some(pos) = unpaid.iter().position(|c| c.asset == item.coin.asset) else {
                    continue;
                };
                unpaid.remove(pos);
                item.out_hash = Some(tx.tx.id.clone());
                allowed.add(&item.coin);
                allowed.add_all(&item.max_gas);
                matched.push(item.clone());
                changed = true;
            }
            if changed {
                touched.push(bucket);
            }
        }

        for bucket in &touched {
            keeper.set_tx_out(bucket)?;
        }

        let extra = extra_funds(&tx.tx.total_spend(), &allowed);
        if matched.is_empty() {
            warn!(tx = %tx.tx.id, in_hash = %in_hash, "[qb-04] Delivered outbound matches no queued item");
        } else {
            debug!(tx = %tx.tx.id, matched = matched.len(), "[qb-04] Outbound items completed");
            metrics::record_completed(matched.len());
        }
        Ok(Completion { matched, extra })
    }

    // =========================================================================
    // END BLOCK
    // =========================================================================

    /// Refresh gas on the current bucket, then requeue dangling actions.
    pub fn end_block(&self, keeper: &mut Keeper) -> OutboundResult<EndBlockReport> {
        let gas_refreshed = self.refresh_gas(keeper)?;
        let dangling = self.find_dangling(keeper)?;
        let requeued = if dangling.is_empty() {
            0
        } else {
            self.requeue_dangling(keeper, &dangling)?
        };
        Ok(EndBlockReport {
            gas_refreshed,
            requeued,
        })
    }

    /// Bring max gas and gas rate of items due this block up to date, in the
    /// bucket and in the matching in-voter action.
    pub fn refresh_gas(&self, keeper: &mut Keeper) -> OutboundResult<usize> {
        let height = keeper.block_height();
        let mut bucket = keeper.get_tx_out(height)?;
        let mut max_gas_cache: BTreeMap<Chain, Option<Coin>> = BTreeMap::new();
        let mut rate_cache: BTreeMap<Chain, u64> = BTreeMap::new();
        let mut refreshed = 0;

        for idx in 0..bucket.tx_array.len() {
            let item = bucket.tx_array[idx].clone();
            if !item.is_pending() {
                continue;
            }
            let voter = if item.in_hash.is_blank() {
                None
            } else {
                store::find_in_voter(keeper, &item.in_hash)?
            };
            if voter
                .as_ref()
                .is_some_and(|v| v.outbound_height > 0 && v.outbound_height < height)
            {
                continue;
            }

            if !max_gas_cache.contains_key(&item.chain) {
                let max_gas = match self.gas.max_gas(keeper, &item.chain) {
                    Ok(coin) => Some(coin),
                    Err(e) => {
                        warn!(chain = %item.chain, error = %e, "[qb-04] No max gas for refresh");
                        None
                    }
                };
                max_gas_cache.insert(item.chain.clone(), max_gas);
            }
            if !rate_cache.contains_key(&item.chain) {
                let rate = self.gas.gas_rate(keeper, &item.chain)?;
                rate_cache.insert(item.chain.clone(), rate);
            }

            let mut updated = item.clone();
            if let Some(Some(max_gas)) = max_gas_cache.get(&item.chain) {
                let stale = updated.max_gas.get(&max_gas.asset) != max_gas.amount;
                if updated.max_gas.is_empty() || (!max_gas.is_empty() && stale) {
                    updated.max_gas = Coins::from(max_gas.clone());
                }
            }
            let rate = rate_cache.get(&item.chain).copied().unwrap_or(0);
            if rate > 0 {
                updated.gas_rate = rate;
            }
            if updated == item {
                continue;
            }

            if let Some(mut voter) = voter {
                if let Some(action) = voter.actions.iter_mut().find(|a| **a == item) {
                    *action = updated.clone();
                    store::set_in_voter(keeper, &voter)?;
                }
            }
            bucket.tx_array[idx] = updated;
            refreshed += 1;
        }

        if refreshed > 0 {
            keeper.set_tx_out(&bucket)?;
            debug!(height, refreshed, "[qb-04] Refreshed outbound gas");
        }
        Ok(refreshed)
    }

    // =========================================================================
    // RECOVERY
    // =========================================================================

    /// Inbounds whose planned actions outlived the signing period without
    /// all being delivered.
    pub fn find_dangling(&self, keeper: &Keeper) -> OutboundResult<Vec<TxId>> {
        let height = keeper.block_height();
        let period =
            u64::try_from(keeper.config_i64(ConstantName::SigningTransactionPeriod)?).unwrap_or(0);

        let mut dangling = Vec::new();
        for voter in store::in_voters(keeper)? {
            let voter = voter?;
            if voter.reverted
                || voter.actions.is_empty()
                || voter.out_txs.len() >= voter.actions.len()
            {
                continue;
            }
            if voter.finalised_height.saturating_add(period) <= height {
                dangling.push(voter.tx_id);
            }
        }
        Ok(dangling)
    }

    /// Move each dangling action to the most secure Active vault at the
    /// current height and give its inbound a fresh liveness window.
    ///
    /// The stale queue entry is removed so the payment exists once. Returns
    /// the number of actions requeued.
    pub fn requeue_dangling(&self, keeper: &mut Keeper, tx_ids: &[TxId]) -> OutboundResult<usize> {
        let active = keeper.vaults_by_status(VaultStatus::Active)?;
        let ranked = self.ranking.rank(keeper, active)?;
        let Some(target) = ranked.last().map(|v| v.pub_key.clone()) else {
            warn!("[qb-04] No active vault to requeue dangling actions to");
            return Ok(0);
        };
        let height = keeper.block_height();
        let mut requeued = 0;

        for tx_id in tx_ids {
            let Some(mut voter) = store::find_in_voter(keeper, tx_id)? else {
                continue;
            };
            if voter.out_txs.len() >= voter.actions.len() {
                debug!(tx = %tx_id, "[qb-04] All actions delivered, nothing to requeue");
                continue;
            }
            let indices = voter.dangling_actions();
            if indices.is_empty() || voter.actions.len() - voter.out_txs.len() != indices.len() {
                debug!(
                    tx = %tx_id,
                    actions = voter.actions.len(),
                    out_txs = voter.out_txs.len(),
                    dangling = indices.len(),
                    "[qb-04] Dangling actions do not add up, skipping"
                );
                continue;
            }

            let since = voter.finalised_height;
            voter.finalised_height = height;
            voter.outbound_height = height;

            for idx in indices {
                let stale = voter.actions[idx].clone();
                if !self.remove_queued(keeper, &stale, since)? {
                    debug!(tx = %tx_id, "[qb-04] Stale action no longer queued");
                }

                let mut action = stale;
                action.vault_pub_key = Some(target.clone());
                match self.gas.max_gas(keeper, &action.chain) {
                    Ok(max_gas) => {
                        action.max_gas = Coins::from(max_gas);
                        action.gas_rate = self.gas.gas_rate(keeper, &action.chain)?;
                    }
                    Err(e) => {
                        warn!(chain = %action.chain, error = %e, "[qb-04] Requeue keeps previous gas");
                    }
                }

                self.unsafe_add_tx_out_item(keeper, action.clone(), height)?;
                keeper.emit(BridgeEvent::ActionRequeued {
                    in_hash: tx_id.clone(),
                    vault: target.clone(),
                });
                voter.actions[idx] = action;
                requeued += 1;
            }

            store::set_in_voter(keeper, &voter)?;
            info!(tx = %tx_id, vault = %target, height, "[qb-04] Requeued dangling actions");
        }

        metrics::record_requeued(requeued);
        Ok(requeued)
    }

    /// Drop the first undelivered copy of `stale` queued at or after `since`.
    fn remove_queued(&self, keeper: &mut Keeper, stale: &TxOutItem, since: u64) -> OutboundResult<bool> {
        let mut found = None;
        for bucket in keeper.tx_out_buckets()? {
            let bucket = bucket?;
            if bucket.height < since {
                continue;
            }
            if let Some(pos) = bucket.tx_array.iter().position(|i| i == stale) {
                found = Some((bucket, pos));
                break;
            }
        }
        let Some((mut bucket, pos)) = found else {
            return Ok(false);
        };
        bucket.tx_array.remove(pos);
        keeper.set_tx_out(&bucket)?;
        Ok(true)
    }
}

impl OutboundLedger for OutboundScheduler {
    fn schedule(&self, keeper: &mut Keeper, item: TxOutItem, min_out: u128) -> ObservationResult<()> {
        self.schedule_outbound(keeper, item, min_out)?;
        Ok(())
    }

    fn complete(
        &self,
        keeper: &mut Keeper,
        tx: &ObservedTx,
        in_hash: &TxId,
    ) -> ObservationResult<Completion> {
        Ok(self.complete_outbound(keeper, tx, in_hash)?)
    }
}
