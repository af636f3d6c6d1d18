//! Voter persistence through the keeper.

use crate::domain::ObservedTxVoter;
use crate::error::ObservationResult;
use qb_01_keeper::{keys, Keeper, TypedIter};
use shared_types::TxId;

pub fn get_in_voter(keeper: &Keeper, tx_id: &TxId) -> ObservationResult<ObservedTxVoter> {
    Ok(keeper
        .get(&keys::key(keys::OBSERVED_TX_IN_VOTER, tx_id.as_str()))?
        .unwrap_or_else(|| ObservedTxVoter::new(tx_id.clone())))
}

/// Like [`get_in_voter`] but `None` when nothing was ever observed.
pub fn find_in_voter(keeper: &Keeper, tx_id: &TxId) -> ObservationResult<Option<ObservedTxVoter>> {
    Ok(keeper.get(&keys::key(keys::OBSERVED_TX_IN_VOTER, tx_id.as_str()))?)
}

pub fn set_in_voter(keeper: &mut Keeper, voter: &ObservedTxVoter) -> ObservationResult<()> {
    keeper.set(
        keys::key(keys::OBSERVED_TX_IN_VOTER, voter.tx_id.as_str()),
        voter,
    )?;
    Ok(())
}

pub fn in_voters(keeper: &Keeper) -> ObservationResult<TypedIter<ObservedTxVoter>> {
    Ok(keeper.iter(keys::OBSERVED_TX_IN_VOTER)?)
}

pub fn get_out_voter(keeper: &Keeper, tx_id: &TxId) -> ObservationResult<ObservedTxVoter> {
    Ok(keeper
        .get(&keys::key(keys::OBSERVED_TX_OUT_VOTER, tx_id.as_str()))?
        .unwrap_or_else(|| ObservedTxVoter::new(tx_id.clone())))
}

pub fn set_out_voter(keeper: &mut Keeper, voter: &ObservedTxVoter) -> ObservationResult<()> {
    keeper.set(
        keys::key(keys::OBSERVED_TX_OUT_VOTER, voter.tx_id.as_str()),
        voter,
    )?;
    Ok(())
}
