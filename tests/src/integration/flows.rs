//! # Integration Test Flows
//!
//! Choreography across qb-03-observation, qb-04-outbound and
//! qb-05-governance through the shared keeper.
//!
//! ## Flows Tested:
//!
//! 1. **Inbound → Schedule → Outbound**: a finalized deposit is dispatched
//!    once, paid out, and the payment is matched back to the deposit
//! 2. **Dispatch failure → Refund**: unreadable instructions return funds;
//!    payments planned before a failure are dropped, and coins that cannot
//!    be sent back stay in the vault
//! 3. **Overspend → Vault slash**: gas beyond the planned max is charged to
//!    the vault members
//! 4. **Errata → No requeue**: a reverted deposit is never paid again
//! 5. **Solvency ↔ Queue**: the check counts assigned but unsent payments

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use node_runtime::{Managers, PassthroughDispatcher};
    use parking_lot::Mutex;
    use qb_01_keeper::Keeper;
    use qb_02_attestation::ClaimProgress;
    use qb_03_observation::{store, InboundDispatcher, ObservationResult};
    use qb_04_outbound::FixedGasManager;
    use qb_05_governance::{solvency_halt_key, ErrataClaim, SolvencyClaim};
    use shared_types::{
        Address, Asset, BridgeEvent, Coin, Coins, ConstantValues, ObservedTx, PubKey, TxId,
        TxOutItem, VaultStatus, ONE,
    };
    use std::sync::Arc;

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    /// Forwards to the passthrough dispatcher and remembers every call.
    #[derive(Default)]
    struct RecordingDispatcher {
        inner: PassthroughDispatcher,
        seen: Mutex<Vec<TxId>>,
    }

    impl InboundDispatcher for RecordingDispatcher {
        fn dispatch(&self, keeper: &mut Keeper, tx: &ObservedTx) -> ObservationResult<Vec<TxOutItem>> {
            self.seen.lock().push(tx.tx.id.clone());
            self.inner.dispatch(keeper, tx)
        }
    }

    fn recording_network() -> (Network, Arc<RecordingDispatcher>) {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let managers = Managers::builder()
            .gas(Arc::new(
                FixedGasManager::new(0).with_chain(btc(), BTC_MAX_GAS, BTC_GAS_RATE),
            ))
            .dispatcher(dispatcher.clone())
            .build();
        let mut net = Network::with_managers(ConstantValues::default(), managers);
        net.add_vault("vault", VaultStatus::Active, &["a", "b", "c"], 100 * ONE);
        (net, dispatcher)
    }

    fn network_with_vault() -> Network {
        let mut net = Network::new();
        net.add_vault("vault", VaultStatus::Active, &["a", "b", "c"], 100 * ONE);
        net
    }

    // =========================================================================
    // INBOUND → OUTBOUND
    // =========================================================================

    #[test]
    fn test_deposit_dispatched_once_and_paid_out() {
        let (mut net, dispatcher) = recording_network();
        let deposit = inbound("AA10", "vault", 5 * ONE, "SEND:bc1friend");

        let reports = net.observe_in(&deposit, &["a", "b", "c"]);
        assert!(reports[0].dispatched.is_empty());
        assert_eq!(reports[1].dispatched, vec![TxId::new("AA10")]);
        assert!(reports[2].dispatched.is_empty());
        assert_eq!(dispatcher.seen.lock().len(), 1);
        assert_eq!(net.vault("vault").coin(&btc().gas_asset()), 105 * ONE);

        let queued = net.queued();
        assert_eq!(queued.len(), 1);
        let (_, item) = &queued[0];
        assert_eq!(item.to_address, Address::new("bc1friend"));
        assert_eq!(item.coin.amount, 5 * ONE);
        assert_eq!(item.memo, "OUT:AA10");
        assert_eq!(item.max_gas, Coins::from(btc_coin(BTC_MAX_GAS)));

        net.at(2);
        let reports = net.observe_out(&delivery_of("BB10", item, 4_000), &["a", "b"]);
        assert_eq!(reports[1].completed, vec![TxId::new("BB10")]);

        let voter = store::get_in_voter(&net.keeper, &TxId::new("AA10")).unwrap();
        assert!(voter.is_done());
        assert_eq!(voter.out_txs.len(), 1);
        assert_eq!(
            net.vault("vault").coin(&btc().gas_asset()),
            100 * ONE - 4_000
        );
        assert!(net.events.of_kind("slash_vault").is_empty());
        assert_eq!(net.events.of_kind("outbound").len(), 1);
    }

    #[test]
    fn test_late_observer_does_not_redispatch() {
        let (mut net, dispatcher) = recording_network();
        let deposit = inbound("AA12", "vault", ONE, "SEND:bc1friend");

        net.observe_in(&deposit, &["a", "b"]);
        net.at(5);
        net.observe_in(&deposit, &["c"]);

        assert_eq!(dispatcher.seen.lock().as_slice(), &[TxId::new("AA12")]);
        assert_eq!(net.queued().len(), 1);
        assert_eq!(net.events.of_kind("inbound_dispatched").len(), 1);
    }

    #[test]
    fn test_empty_memo_deposit_completes_without_payment() {
        let mut net = network_with_vault();
        net.observe_in(&inbound("AA13", "vault", ONE, ""), &["a", "b"]);

        let voter = store::get_in_voter(&net.keeper, &TxId::new("AA13")).unwrap();
        assert!(voter.is_done());
        assert!(net.queued().is_empty());
    }

    // =========================================================================
    // FAILURE PATHS
    // =========================================================================

    #[test]
    fn test_unreadable_instruction_refunds_sender() {
        let mut net = network_with_vault();
        net.observe_in(&inbound("AA11", "vault", 5 * ONE, "SWAP:BTC.BTC"), &["a", "b"]);

        assert_eq!(net.events.of_kind("refund").len(), 1);
        let queued = net.queued();
        assert_eq!(queued.len(), 1);
        let (_, refund) = &queued[0];
        assert_eq!(refund.to_address, Address::new("bc1user"));
        assert_eq!(refund.memo, "REFUND:AA11");
        assert_eq!(refund.coin.amount, 5 * ONE);
    }

    #[test]
    fn test_failed_payment_drops_earlier_payments_before_refund() {
        let fee = 5;
        let mut net = Network::with_outbound_fee(fee);
        net.add_vault("vault", VaultStatus::Active, &["a", "b", "c"], 100 * ONE);

        // the token output is eaten by the fee, the BTC one is not
        let token = Coin::new(Asset::new(btc(), "TKN"), fee);
        let mut coins = Coins::from(btc_coin(ONE / 100));
        coins.add(&token);
        let mut deposit = inbound("AA30", "vault", 0, "SEND:bc1friend");
        deposit.tx.coins = coins;

        let reports = net.observe_in(&deposit, &["a", "b"]);
        assert!(reports[1].dispatched.is_empty());

        let queued = net.queued();
        assert_eq!(queued.len(), 1, "{:?}", queued);
        let (_, refund) = &queued[0];
        assert_eq!(refund.to_address, Address::new("bc1user"));
        assert_eq!(refund.memo, "REFUND:AA30");
        assert_eq!(refund.coin, btc_coin(ONE / 100 - fee));
        assert!(queued
            .iter()
            .all(|(_, item)| item.to_address != Address::new("bc1friend")));

        match &net.events.of_kind("refund")[..] {
            [BridgeEvent::Refund { coins, .. }] => {
                assert_eq!(coins, &Coins::from(btc_coin(ONE / 100)));
            }
            other => panic!("unexpected refunds {:?}", other),
        }
        match &net.events.of_kind("unrefundable_coin")[..] {
            [BridgeEvent::UnrefundableCoin { coin, .. }] => assert_eq!(coin, &token),
            other => panic!("unexpected events {:?}", other),
        }
        assert!(net.events.of_kind("inbound_dispatched").is_empty());

        let voter = store::get_in_voter(&net.keeper, &TxId::new("AA30")).unwrap();
        assert_eq!(voter.actions.len(), 1);
        assert!(!voter.is_done());
        assert_eq!(net.vault("vault").coin(&token.asset), fee);
    }

    #[test]
    fn test_refund_that_cannot_be_queued_leaves_coins_in_vault() {
        let mut net = Network::with_outbound_fee(5_000);
        net.add_vault("vault", VaultStatus::Active, &["a", "b", "c"], 100 * ONE);

        net.observe_in(&inbound("AA31", "vault", 4_000, "garbage-memo"), &["a", "b"]);

        assert!(net.queued().is_empty());
        assert!(net.events.of_kind("refund").is_empty());
        match &net.events.of_kind("unrefundable_coin")[..] {
            [BridgeEvent::UnrefundableCoin { tx_id, coin, .. }] => {
                assert_eq!(tx_id, &TxId::new("AA31"));
                assert_eq!(coin, &btc_coin(4_000));
            }
            other => panic!("unexpected events {:?}", other),
        }
        assert_eq!(
            net.vault("vault").coin(&btc().gas_asset()),
            100 * ONE + 4_000
        );

        let voter = store::get_in_voter(&net.keeper, &TxId::new("AA31")).unwrap();
        assert!(voter.actions.is_empty());
        assert!(voter.is_done());
    }

    #[test]
    fn test_overspent_gas_slashes_vault() {
        let mut net = network_with_vault();
        net.observe_in(&inbound("AA14", "vault", ONE, "SEND:bc1friend"), &["a", "b"]);
        let (_, item) = net.queued().remove(0);

        net.at(2);
        let overspend = BTC_MAX_GAS * 3;
        let reports = net.observe_out(&delivery_of("BB14", &item, overspend), &["a", "b"]);
        assert_eq!(reports[1].completed, vec![TxId::new("BB14")]);

        let slashed = net.events.of_kind("slash_vault");
        assert_eq!(slashed.len(), 1);
        match &slashed[0] {
            BridgeEvent::SlashVault { pub_key, coins, .. } => {
                assert_eq!(pub_key, &PubKey::new("vault"));
                assert_eq!(coins, &Coins::from(btc_coin(overspend - BTC_MAX_GAS)));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    // =========================================================================
    // GOVERNANCE
    // =========================================================================

    fn report_solvency(net: &mut Network, claim: &SolvencyClaim) {
        for signer in ["a", "b"] {
            net.keeper.begin();
            net.managers
                .governance
                .handle_solvency(&mut net.keeper, claim, &addr(signer))
                .unwrap();
            net.keeper.commit().unwrap();
        }
    }

    #[test]
    fn test_errata_reverts_deposit_and_blocks_requeue() {
        let mut net = network_with_vault();
        net.observe_in(&inbound("AA15", "vault", 5 * ONE, "SEND:bc1friend"), &["a", "b"]);
        assert_eq!(net.vault("vault").coin(&btc().gas_asset()), 105 * ONE);

        let claim = ErrataClaim::new(TxId::new("AA15"), btc());
        let mut progress = Vec::new();
        for signer in ["a", "b"] {
            net.keeper.begin();
            progress.push(
                net.managers
                    .governance
                    .handle_errata(&mut net.keeper, &claim, &addr(signer))
                    .unwrap(),
            );
            net.keeper.commit().unwrap();
        }
        assert_eq!(progress, vec![ClaimProgress::Pending, ClaimProgress::Finalized]);

        let voter = store::get_in_voter(&net.keeper, &TxId::new("AA15")).unwrap();
        assert!(voter.reverted);
        assert_eq!(net.vault("vault").coin(&btc().gas_asset()), 100 * ONE);
        assert_eq!(net.events.of_kind("errata").len(), 1);

        net.at(1 + 300);
        assert_eq!(net.end_block().requeued, 0);
    }

    #[test]
    fn test_solvency_counts_pending_payments() {
        let mut net = network_with_vault();
        net.schedule(payment("bc1friend", 40 * ONE, "AA16"));
        net.at(50);

        let solvent = SolvencyClaim::new(
            btc(),
            PubKey::new("vault"),
            Coins::from(btc_coin(60 * ONE)),
            10,
        );
        let short = SolvencyClaim::new(
            btc(),
            PubKey::new("vault"),
            Coins::from(btc_coin(30 * ONE)),
            11,
        );
        let halt_key = solvency_halt_key(&btc());

        // 100 held minus 40 assigned matches the 60 the wallet reports
        report_solvency(&mut net, &solvent);
        assert!(net.keeper.get_mimir(&halt_key).unwrap() <= 0);

        report_solvency(&mut net, &short);
        assert_eq!(net.keeper.get_mimir(&halt_key).unwrap(), 50);
        assert_eq!(net.events.of_kind("solvency_halt").len(), 1);
    }
}
