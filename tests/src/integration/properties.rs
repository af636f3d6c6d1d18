//! # Randomised Invariants
//!
//! Seeded runs over quorum arithmetic, attestation voters, vault discovery
//! and dangling-action accounting. Seeds are fixed so failures reproduce.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use qb_02_attestation::{
        has_consensus, has_super_majority, AttestationVoter, RecordOutcome, ValidatorSet,
    };
    use qb_03_observation::ObservedTxVoter;
    use qb_04_outbound::{discover_outbounds, usable_balance};
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use shared_types::{
        Address, Coins, NodeAddress, PubKey, Tx, TxId, TxOutItem, Vault, VaultStatus,
    };
    use std::collections::BTreeSet;

    const RUNS: usize = 500;

    fn validators(n: usize) -> (ValidatorSet, Vec<NodeAddress>) {
        let members: Vec<NodeAddress> = (0..n).map(|i| addr(&format!("node-{}", i))).collect();
        let mut set = ValidatorSet::new(1);
        for member in &members {
            set.add_validator(member.clone());
        }
        (set, members)
    }

    // =========================================================================
    // QUORUM
    // =========================================================================

    #[test]
    fn test_super_majority_is_monotonic() {
        for total in 1..=60 {
            let mut reached = false;
            for count in 0..=total {
                let now = has_super_majority(count, total);
                assert!(!reached || now, "lost majority at {}/{}", count, total);
                reached |= now;
            }
            assert!(has_super_majority(total, total));
            assert!(!has_super_majority(total + 1, total));
        }
    }

    #[test]
    fn test_adding_signers_never_breaks_consensus() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..RUNS {
            let (set, members) = validators(rng.gen_range(1..=25));
            let mut order = members.clone();
            order.shuffle(&mut rng);

            let mut signers: BTreeSet<NodeAddress> = BTreeSet::new();
            let mut reached = false;
            for signer in order {
                signers.insert(signer);
                let now = has_consensus(signers.iter(), &set);
                assert!(!reached || now);
                reached |= now;
            }
            assert!(reached);
        }
    }

    #[test]
    fn test_outsiders_carry_no_weight() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..RUNS {
            let n = rng.gen_range(1..=20);
            let (set, members) = validators(n);
            let inside = rng.gen_range(0..=n);
            let mut signers: Vec<NodeAddress> = members[..inside].to_vec();
            signers.extend((0..rng.gen_range(0..10)).map(|i| addr(&format!("outsider-{}", i))));

            assert_eq!(
                has_consensus(signers.iter(), &set),
                has_super_majority(inside, n)
            );
        }
    }

    // =========================================================================
    // ATTESTATION VOTER
    // =========================================================================

    #[test]
    fn test_voter_finalizes_exactly_once() {
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..RUNS {
            let (set, members) = validators(rng.gen_range(1..=12));
            let mut voter: AttestationVoter<u8> = AttestationVoter::new("claim");
            let mut finalized = 0;
            let mut first_height = 0;

            for height in 1..=40u64 {
                let signer = members.choose(&mut rng).unwrap();
                // payload 0 is canonical most of the time
                let payload = if rng.gen_bool(0.2) { 1 } else { 0 };
                let outcome = voter.record(signer, payload);
                if outcome == RecordOutcome::Conflicting {
                    assert_ne!(voter.canonical, Some(payload));
                }
                if voter.has_consensus(&set) && voter.finalize(height) {
                    finalized += 1;
                    first_height = height;
                }
            }

            assert!(finalized <= 1);
            if finalized == 1 {
                assert_eq!(voter.finalized_height, first_height);
                assert!(!voter.finalize(first_height + 1));
            }
        }
    }

    // =========================================================================
    // DISCOVERY
    // =========================================================================

    #[test]
    fn test_discovery_conserves_requested_amount() {
        let mut rng = StdRng::seed_from_u64(17);
        let max_gas = btc_coin(BTC_MAX_GAS);

        for _ in 0..RUNS {
            let vaults: Vec<Vault> = (0..rng.gen_range(0..6))
                .map(|i| {
                    let mut vault = Vault::new(
                        PubKey::new(&format!("vault-{}", i)),
                        VaultStatus::Active,
                        Vec::new(),
                        1,
                    );
                    vault.add_funds(&Coins::from(btc_coin(rng.gen_range(0..2_000_000))));
                    vault
                })
                .collect();
            let fee = rng.gen_range(0..50_000);
            let request = payment("bc1dest", rng.gen_range(1..5_000_000), "AA01");

            let (outputs, remainder) = discover_outbounds(fee, &max_gas, &request, &vaults);

            let assigned: u128 = outputs.iter().map(|o| o.coin.amount).sum();
            assert_eq!(assigned + remainder, request.coin.amount);

            let mut used = BTreeSet::new();
            for output in &outputs {
                let key = output.vault_pub_key.clone().unwrap();
                assert!(used.insert(key.clone()), "vault {} used twice", key);
                let vault = vaults.iter().find(|v| v.pub_key == key).unwrap();
                let usable = usable_balance(vault, &request, fee, &max_gas).unwrap();
                assert!(output.coin.amount > 0 && output.coin.amount <= usable);
            }

            if remainder > 0 {
                // every vault that could pay was drained
                let capacity: u128 = vaults
                    .iter()
                    .filter_map(|v| usable_balance(v, &request, fee, &max_gas))
                    .sum();
                assert_eq!(assigned, capacity);
            }
        }
    }

    #[test]
    fn test_vault_never_pays_itself() {
        let vault_key = PubKey::new("self");
        let mut vault = Vault::new(vault_key.clone(), VaultStatus::Active, Vec::new(), 1);
        vault.add_funds(&Coins::from(btc_coin(1_000_000)));
        let request = TxOutItem::new(
            btc(),
            vault_key.address(&btc()),
            btc_coin(500),
            TxId::new("AA01"),
        );

        let (outputs, remainder) =
            discover_outbounds(0, &btc_coin(BTC_MAX_GAS), &request, &[vault]);
        assert!(outputs.is_empty());
        assert_eq!(remainder, 500);
    }

    // =========================================================================
    // DANGLING ACTIONS
    // =========================================================================

    #[test]
    fn test_dangling_count_matches_undelivered_actions() {
        let mut rng = StdRng::seed_from_u64(19);
        for _ in 0..RUNS {
            let mut voter = ObservedTxVoter::new(TxId::new("AA01"));
            let actions = rng.gen_range(1..8);
            for i in 0..actions {
                let item = payment(&format!("bc1dest{}", i), 1_000 + i as u128, "AA01")
                    .with_memo("OUT:AA01")
                    .with_vault(PubKey::new("vault"));
                voter.add_action(item);
            }

            let mut delivered: Vec<usize> = (0..actions).collect();
            delivered.shuffle(&mut rng);
            delivered.truncate(rng.gen_range(0..=actions));
            for (n, idx) in delivered.iter().enumerate() {
                let action = &voter.actions[*idx];
                let tx = Tx {
                    id: TxId::new(&format!("BB{:02}", n)),
                    chain: btc(),
                    from_address: Address::new("vault-address"),
                    to_address: action.to_address.clone(),
                    coins: Coins::from(action.coin.clone()),
                    gas: Coins::new(),
                    memo: action.memo.clone(),
                };
                assert!(voter.add_out_tx(tx));
            }

            let dangling = voter.dangling_actions();
            assert_eq!(dangling.len(), actions - delivered.len());
            for idx in &dangling {
                assert!(!delivered.contains(idx));
            }
        }
    }
}
