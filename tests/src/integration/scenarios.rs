//! # Walkthrough Scenarios
//!
//! End-to-end walkthroughs of the bridge's core decisions on a three node
//! network (a, b, c):
//!
//! 1. **Economic mimir**: 2 of 3 node votes set a key
//! 2. **Operational mimir**: `HaltSigning` also needs the absolute floor
//! 3. **Retiring vault discovery**: a lone Retiring vault still pays
//! 4. **Dangling requeue**: an undelivered action moves to the most secure
//!    vault once the signing period runs out

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use qb_01_keeper::MIMIR_UNSET;
    use qb_03_observation::store;
    use qb_04_outbound::discover_outbounds;
    use qb_05_governance::MimirOutcome;
    use shared_types::{Address, BridgeEvent, PubKey, TxId, VaultStatus, ONE};

    // =========================================================================
    // MIMIR
    // =========================================================================

    #[test]
    fn test_economic_key_needs_two_thirds() {
        let mut net = Network::new();

        assert_eq!(net.vote_mimir("K", 1, "a"), MimirOutcome::Recorded);
        assert_eq!(net.keeper.get_mimir("K").unwrap(), MIMIR_UNSET);

        assert_eq!(net.vote_mimir("K", 1, "b"), MimirOutcome::Applied(1));
        assert_eq!(net.keeper.get_mimir("K").unwrap(), 1);
        assert_eq!(net.events.of_kind("set_mimir").len(), 1);
        assert_eq!(net.events.of_kind("set_node_mimir").len(), 2);
    }

    #[test]
    fn test_operational_key_needs_vote_floor() {
        let mut net = Network::new();

        net.vote_mimir("HaltSigning", 1, "a");
        net.vote_mimir("HaltSigning", 1, "b");
        // 2 of 3 is a super majority but below OperationalVotesMin
        assert_eq!(net.keeper.get_mimir("HaltSigning").unwrap(), MIMIR_UNSET);

        assert_eq!(net.vote_mimir("HaltSigning", 1, "c"), MimirOutcome::Applied(1));
        assert_eq!(net.keeper.get_mimir("HaltSigning").unwrap(), 1);
    }

    #[test]
    fn test_repeat_vote_for_current_value_is_unchanged() {
        let mut net = Network::new();
        net.vote_mimir("K", 7, "a");
        net.vote_mimir("K", 7, "b");

        assert_eq!(net.vote_mimir("K", 7, "c"), MimirOutcome::Unchanged);
        assert_eq!(net.events.of_kind("set_mimir").len(), 1);
    }

    // =========================================================================
    // DISCOVERY
    // =========================================================================

    #[test]
    fn test_single_retiring_vault_pays() {
        let mut net = Network::new();
        net.add_vault("retiring", VaultStatus::Retiring, &["a"], 2 * ONE);
        let request = payment("bc1dest", 1024, "AA01");

        let candidates = net.managers.scheduler.candidate_vaults(&net.keeper).unwrap();
        let (outputs, remainder) =
            discover_outbounds(0, &btc_coin(BTC_MAX_GAS), &request, &candidates);
        assert_eq!(remainder, 0);
        assert_eq!(outputs.len(), 1);

        let scheduled = net.schedule(request);
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].vault_pub_key, Some(PubKey::new("retiring")));
        assert_eq!(scheduled[0].coin.amount, 1024);
        assert_eq!(scheduled[0].memo, "OUT:AA01");
    }

    // =========================================================================
    // REQUEUE
    // =========================================================================

    #[test]
    fn test_dangling_action_requeued_to_most_secure_vault() {
        let mut net = Network::new();
        net.add_vault("low", VaultStatus::Active, &["a"], 10 * ONE);
        net.add_vault("high", VaultStatus::Active, &["a", "b", "c"], 100 * ONE);

        net.at(100);
        let alice = net.schedule(payment("bc1alice", ONE, "AA01")).remove(0);
        let bob = net.schedule(payment("bc1bob", ONE, "AA01")).remove(0);
        assert_eq!(alice.vault_pub_key, Some(PubKey::new("low")));
        assert_eq!(bob.vault_pub_key, Some(PubKey::new("low")));

        net.at(101);
        let reports = net.observe_out(&delivery_of("BB01", &alice, 5_000), &["a", "b"]);
        assert!(reports[0].completed.is_empty());
        assert_eq!(reports[1].completed, vec![TxId::new("BB01")]);

        let voter = store::get_in_voter(&net.keeper, &TxId::new("AA01")).unwrap();
        assert_eq!(voter.out_txs.len(), 1);
        assert_eq!(voter.dangling_actions(), vec![1]);

        // one block short of the signing period
        net.at(399);
        assert_eq!(net.end_block().requeued, 0);

        net.at(400);
        assert_eq!(net.end_block().requeued, 1);

        let voter = store::get_in_voter(&net.keeper, &TxId::new("AA01")).unwrap();
        assert_eq!(voter.finalised_height, 400);
        assert_eq!(voter.outbound_height, 400);
        assert_eq!(voter.actions[0].vault_pub_key, Some(PubKey::new("low")));
        assert_eq!(voter.actions[1].vault_pub_key, Some(PubKey::new("high")));

        let queued = net.queued();
        assert_eq!(queued.len(), 2);
        let (height, paid) = &queued[0];
        assert_eq!(*height, 100);
        assert_eq!(paid.to_address, Address::new("bc1alice"));
        assert_eq!(paid.out_hash, Some(TxId::new("BB01")));
        let (height, moved) = &queued[1];
        assert_eq!(*height, 400);
        assert_eq!(moved.to_address, Address::new("bc1bob"));
        assert_eq!(moved.vault_pub_key, Some(PubKey::new("high")));
        assert!(moved.is_pending());

        let requeued = net.events.of_kind("action_requeued");
        assert_eq!(requeued.len(), 1);
        assert!(matches!(
            &requeued[0],
            BridgeEvent::ActionRequeued { vault, .. } if vault == &PubKey::new("high")
        ));
    }

    #[test]
    fn test_requeued_action_settles_from_new_vault() {
        let mut net = Network::new();
        net.add_vault("low", VaultStatus::Active, &["a"], 10 * ONE);
        net.add_vault("high", VaultStatus::Active, &["a", "b", "c"], 100 * ONE);

        net.at(100);
        net.schedule(payment("bc1bob", ONE, "AA02"));
        net.at(400);
        assert_eq!(net.end_block().requeued, 1);

        let (_, moved) = net.queued().pop().unwrap();
        net.at(401);
        let reports = net.observe_out(&delivery_of("BB02", &moved, 0), &["a", "b"]);
        assert_eq!(reports[1].completed, vec![TxId::new("BB02")]);

        let voter = store::get_in_voter(&net.keeper, &TxId::new("AA02")).unwrap();
        assert!(voter.dangling_actions().is_empty());

        net.at(800);
        assert_eq!(net.end_block().requeued, 0);
        assert_eq!(net.vault("high").coin(&btc().gas_asset()), 99 * ONE);
    }
}
