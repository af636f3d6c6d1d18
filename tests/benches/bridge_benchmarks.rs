//! # Bridge Benchmarks
//!
//! Hot paths executed for every observation and every payment:
//!
//! | Subsystem | Path | Scales with |
//! |-----------|------|-------------|
//! | qb-02 Attestation | `has_consensus` | active set size |
//! | qb-04 Outbound | `discover_outbounds` | candidate vault count |
//! | qb-03 Observation | `dangling_actions` | planned actions per inbound |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qb_02_attestation::{has_consensus, ValidatorSet};
use qb_03_observation::ObservedTxVoter;
use qb_04_outbound::discover_outbounds;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::{
    Address, Chain, Coin, Coins, NodeAddress, PubKey, Tx, TxId, TxOutItem, Vault, VaultStatus,
};
use std::time::Duration;

fn btc() -> Chain {
    Chain::new("BTC").unwrap()
}

fn btc_coin(amount: u128) -> Coin {
    Coin::new(btc().gas_asset(), amount)
}

// ============================================================================
// QB-02: Quorum
// ============================================================================

fn bench_consensus(c: &mut Criterion) {
    let mut group = c.benchmark_group("qb-02-attestation");
    group.measurement_time(Duration::from_secs(5));

    for size in [10usize, 50, 100, 400] {
        let members: Vec<NodeAddress> = (0..size)
            .map(|i| NodeAddress::new(&format!("node-{}", i)))
            .collect();
        let mut set = ValidatorSet::new(1);
        for member in &members {
            set.add_validator(member.clone());
        }
        let signers = &members[..size * 2 / 3 + 1];

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("has_consensus", size), &size, |b, _| {
            b.iter(|| black_box(has_consensus(signers.iter(), &set)))
        });
    }
    group.finish();
}

// ============================================================================
// QB-04: Vault Discovery
// ============================================================================

fn bench_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("qb-04-outbound");
    let mut rng = StdRng::seed_from_u64(42);
    let max_gas = btc_coin(10_000);

    for count in [2usize, 16, 128] {
        let vaults: Vec<Vault> = (0..count)
            .map(|i| {
                let mut vault =
                    Vault::new(PubKey::new(&format!("vault-{}", i)), VaultStatus::Active, Vec::new(), 1);
                vault.add_funds(&Coins::from(btc_coin(rng.gen_range(20_000..1_000_000))));
                vault
            })
            .collect();
        // large enough to touch most vaults
        let item = TxOutItem::new(
            btc(),
            Address::new("bc1dest"),
            btc_coin(count as u128 * 400_000),
            TxId::new("AA01"),
        );

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("discover_outbounds", count), &count, |b, _| {
            b.iter(|| black_box(discover_outbounds(2_000, &max_gas, &item, &vaults)))
        });
    }
    group.finish();
}

// ============================================================================
// QB-03: Dangling Actions
// ============================================================================

fn bench_dangling(c: &mut Criterion) {
    let mut group = c.benchmark_group("qb-03-observation");

    for actions in [1usize, 8, 64] {
        let mut voter = ObservedTxVoter::new(TxId::new("AA01"));
        for i in 0..actions {
            let item = TxOutItem::new(
                btc(),
                Address::new(&format!("bc1dest{}", i)),
                btc_coin(1_000),
                TxId::new("AA01"),
            )
            .with_memo("OUT:AA01");
            voter.add_action(item);
        }
        // half delivered
        for i in (0..actions).step_by(2) {
            let action = voter.actions[i].clone();
            voter.add_out_tx(Tx {
                id: TxId::new(&format!("BB{:04}", i)),
                chain: btc(),
                from_address: Address::new("vault-address"),
                to_address: action.to_address,
                coins: Coins::from(action.coin),
                gas: Coins::new(),
                memo: action.memo,
            });
        }

        group.bench_with_input(BenchmarkId::new("dangling_actions", actions), &actions, |b, _| {
            b.iter(|| black_box(voter.dangling_actions()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_consensus, bench_discovery, bench_dangling);
criterion_main!(benches);
