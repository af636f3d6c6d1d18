//! Claim voter persistence through the keeper.

use crate::domain::{BanClaim, ErrataClaim, SolvencyClaim};
use crate::error::GovernanceResult;
use qb_01_keeper::{keys, Keeper};
use qb_02_attestation::AttestationVoter;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub type BanVoter = AttestationVoter<BanClaim>;
pub type ErrataVoter = AttestationVoter<ErrataClaim>;
pub type SolvencyVoter = AttestationVoter<SolvencyClaim>;

fn load<P>(keeper: &Keeper, prefix: &str, id: &str) -> GovernanceResult<AttestationVoter<P>>
where
    P: PartialEq + DeserializeOwned,
{
    Ok(keeper
        .get(&keys::key(prefix, id))?
        .unwrap_or_else(|| AttestationVoter::new(id)))
}

fn save<P>(keeper: &mut Keeper, prefix: &str, voter: &AttestationVoter<P>) -> GovernanceResult<()>
where
    P: Serialize,
{
    keeper.set(keys::key(prefix, &voter.claim_id), voter)?;
    Ok(())
}

pub fn get_ban_voter(keeper: &Keeper, claim: &BanClaim) -> GovernanceResult<BanVoter> {
    load(keeper, keys::BAN_VOTER, &claim.id())
}

pub fn set_ban_voter(keeper: &mut Keeper, voter: &BanVoter) -> GovernanceResult<()> {
    save(keeper, keys::BAN_VOTER, voter)
}

pub fn get_errata_voter(keeper: &Keeper, claim: &ErrataClaim) -> GovernanceResult<ErrataVoter> {
    load(keeper, keys::ERRATA_VOTER, &claim.id())
}

pub fn set_errata_voter(keeper: &mut Keeper, voter: &ErrataVoter) -> GovernanceResult<()> {
    save(keeper, keys::ERRATA_VOTER, voter)
}

pub fn get_solvency_voter(
    keeper: &Keeper,
    claim: &SolvencyClaim,
) -> GovernanceResult<SolvencyVoter> {
    load(keeper, keys::SOLVENCY_VOTER, &claim.id())
}

pub fn set_solvency_voter(keeper: &mut Keeper, voter: &SolvencyVoter) -> GovernanceResult<()> {
    save(keeper, keys::SOLVENCY_VOTER, voter)
}
