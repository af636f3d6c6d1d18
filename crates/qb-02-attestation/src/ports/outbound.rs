//! Driven ports

use crate::domain::validator_set::ValidatorSet;
use crate::error::AttestationResult;
use qb_01_keeper::Keeper;

/// Source of the active validator set.
///
/// Validator lifecycle is owned elsewhere; this core only reads who is
/// currently Active at the keeper's block height.
pub trait ValidatorSetProvider: Send + Sync {
    fn active_set(&self, keeper: &Keeper) -> AttestationResult<ValidatorSet>;
}
