//! # Quorum Rules
//!
//! Pure threshold functions over a signer set and the active validator set.
//!
//! | Claim | Rule |
//! |-------|------|
//! | Ban, ErrataTx, Solvency, ObservedTx | `has_consensus`: 2/3 of active weight |
//! | Operational mimir | `operational_threshold`: absolute vote floor |
//! | Economic mimir | `economic_super_majority`: 2/3, ties undefined |
//!
//! Only votes from active signers count, one vote per signer.

use crate::domain::validator_set::ValidatorSet;
use shared_types::NodeAddress;
use std::collections::BTreeMap;

/// Mimir key prefixes governed by the operational vote floor.
const OPERATIONAL_PREFIXES: [&str; 4] = ["HALT", "PAUSE", "STOPSOLVENCYCHECK", "SOLVENCYHALT"];

/// `3 * count >= 2 * total`, false for an empty set or impossible counts.
pub fn has_super_majority(count: usize, total: usize) -> bool {
    if total == 0 || count > total {
        return false;
    }
    count.saturating_mul(3) >= total.saturating_mul(2)
}

/// Whether the active members of `signers` carry 2/3 of the active weight.
pub fn has_consensus<'a>(
    signers: impl IntoIterator<Item = &'a NodeAddress>,
    active: &ValidatorSet,
) -> bool {
    has_super_majority(active.weight_of(signers), active.total_weight())
}

/// Value for an operational key, or `None` when fewer than `min_votes`
/// active signers agree on one value or the top count is tied.
pub fn operational_threshold<'a>(
    votes: impl IntoIterator<Item = (&'a NodeAddress, i64)>,
    active: &ValidatorSet,
    min_votes: i64,
) -> Option<i64> {
    let (value, count) = leading_value(votes, active)?;
    let floor = usize::try_from(min_votes.max(1)).unwrap_or(usize::MAX);
    (count >= floor).then_some(value)
}

/// Value for an economic key, or `None` unless one value holds a 2/3
/// supermajority of the active set.
pub fn economic_super_majority<'a>(
    votes: impl IntoIterator<Item = (&'a NodeAddress, i64)>,
    active: &ValidatorSet,
) -> Option<i64> {
    let (value, count) = leading_value(votes, active)?;
    has_super_majority(count, active.total_weight()).then_some(value)
}

pub fn is_operational_key(key: &str) -> bool {
    let upper = key.to_ascii_uppercase();
    OPERATIONAL_PREFIXES.iter().any(|p| upper.starts_with(p))
}

/// Most-voted value among active signers; `None` on no votes or a tie.
fn leading_value<'a>(
    votes: impl IntoIterator<Item = (&'a NodeAddress, i64)>,
    active: &ValidatorSet,
) -> Option<(i64, usize)> {
    // last vote per signer wins
    let by_signer: BTreeMap<&NodeAddress, i64> = votes
        .into_iter()
        .filter(|(signer, _)| active.contains(signer))
        .collect();

    let mut tally: BTreeMap<i64, usize> = BTreeMap::new();
    for value in by_signer.values() {
        *tally.entry(*value).or_default() += 1;
    }

    let top = tally.values().copied().max()?;
    let mut leaders = tally.iter().filter(|(_, count)| **count == top);
    let (value, _) = leaders.next()?;
    if leaders.next().is_some() {
        return None;
    }
    Some((*value, top))
}
