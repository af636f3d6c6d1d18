//! # Slasher
//!
//! Penalties applied to validators: slash points, bond slashing and
//! slashing a whole vault for moving unscheduled funds.

use crate::domain::validator_set::ValidatorSet;
use crate::error::AttestationResult;
use crate::metrics;
use qb_01_keeper::Keeper;
use shared_types::{BondEventKind, BridgeEvent, Coins, ConstantName, NodeAddress, PubKey, TxId};
use std::collections::BTreeSet;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, Default)]
pub struct Slasher;

impl Slasher {
    pub fn new() -> Self {
        Self
    }

    pub fn inc_slash_points<'a>(
        &self,
        keeper: &mut Keeper,
        points: i64,
        nodes: impl IntoIterator<Item = &'a NodeAddress>,
    ) -> AttestationResult<()> {
        for node in nodes {
            keeper.inc_slash_points(node, points)?;
            metrics::record_slash_points(points);
        }
        Ok(())
    }

    pub fn dec_slash_points<'a>(
        &self,
        keeper: &mut Keeper,
        points: i64,
        nodes: impl IntoIterator<Item = &'a NodeAddress>,
    ) -> AttestationResult<()> {
        for node in nodes {
            keeper.dec_slash_points(node, points)?;
        }
        Ok(())
    }

    /// Penalise active validators that did not sign a finalized claim.
    pub fn lack_of_observation(
        &self,
        keeper: &mut Keeper,
        signers: &BTreeSet<NodeAddress>,
        active: &ValidatorSet,
    ) -> AttestationResult<()> {
        let points = keeper.config_i64(ConstantName::LackOfObservationPenalty)?;
        let absent: Vec<NodeAddress> = active
            .iter()
            .filter(|node| !signers.contains(*node))
            .cloned()
            .collect();
        for node in &absent {
            keeper.inc_slash_points(node, points)?;
            keeper.emit(BridgeEvent::SlashPoints {
                node: node.clone(),
                delta: points,
                reason: "lack_of_observation".into(),
            });
        }
        Ok(())
    }

    /// Move up to `amount` of the node's bond into the reserve.
    pub fn slash_bond(
        &self,
        keeper: &mut Keeper,
        node: &NodeAddress,
        amount: u128,
    ) -> AttestationResult<u128> {
        let moved = keeper.send_bond_to_reserve(node, amount)?;
        if moved > 0 {
            keeper.emit(BridgeEvent::Bond {
                node: node.clone(),
                amount: moved,
                kind: BondEventKind::Slash,
            });
        }
        Ok(moved)
    }

    /// A vault sent funds that no scheduled outbound accounts for. Every
    /// member node is charged `ExtraFundsSlashPoints`.
    pub fn slash_vault(
        &self,
        keeper: &mut Keeper,
        vault: &PubKey,
        coins: &Coins,
        tx_id: &TxId,
        reason: &str,
    ) -> AttestationResult<()> {
        let Some(v) = keeper.get_vault(vault)? else {
            warn!(vault = %vault, "[qb-02] Cannot slash unknown vault");
            return Ok(());
        };
        let points = keeper.config_i64(ConstantName::ExtraFundsSlashPoints)?;

        for member in &v.membership {
            match keeper.node_account_by_pub_key(member)? {
                Some(node) => {
                    keeper.inc_slash_points(&node.node_address, points)?;
                    keeper.emit(BridgeEvent::SlashPoints {
                        node: node.node_address.clone(),
                        delta: points,
                        reason: reason.to_string(),
                    });
                }
                None => warn!(member = %member, "[qb-02] Vault member has no node account"),
            }
        }

        info!(
            vault = %vault,
            tx = %tx_id,
            reason,
            "[qb-02] Slashing vault for unscheduled funds"
        );
        keeper.emit(BridgeEvent::SlashVault {
            pub_key: vault.clone(),
            coins: coins.clone(),
            reason: reason.to_string(),
        });
        keeper.emit(BridgeEvent::Security {
            tx_id: tx_id.clone(),
            msg: format!("vault {} sent unscheduled funds: {}", vault, reason),
        });
        metrics::record_vault_slashed();
        Ok(())
    }
}
