//! # Vault Discovery
//!
//! Splits a requested payment across candidate vaults. Candidates arrive in
//! preference order (Active before Retiring, each ascending by security) with
//! the value of their undelivered outbounds already deducted.
//!
//! ```text
//! request 1_500 ──→ vault A (usable 600) ──→ item 600 @A
//!                   vault B (usable 400) ──→ item 400 @B
//!                   vault C (usable 900) ──→ item 500 @C   remainder 0
//! ```

use shared_types::{Coin, TxOutItem, Vault};

/// How much of `item`'s asset `vault` can commit, or `None` when the vault
/// must not fund it at all.
///
/// A vault is skipped when it would pay itself, is frozen on the chain,
/// holds no more than the outbound fee, or cannot pay `max_gas`. For a
/// gas-asset outbound the max gas is reserved out of the balance.
pub fn usable_balance(vault: &Vault, item: &TxOutItem, fee: u128, max_gas: &Coin) -> Option<u128> {
    if vault.address(&item.chain) == item.to_address || vault.is_frozen(&item.chain) {
        return None;
    }

    let mut available = vault.coin(&item.coin.asset);
    if available == 0 || available <= fee {
        return None;
    }

    let gas_held = vault.coin(&max_gas.asset);
    if gas_held == 0 || gas_held < max_gas.amount {
        return None;
    }

    if item.coin.asset == max_gas.asset {
        available = available.saturating_sub(max_gas.amount);
        if available == 0 {
            return None;
        }
    }
    Some(available)
}

/// Greedily assign `item` to successive vaults until it is covered.
///
/// Returns the outputs, each a copy of `item` bound to one vault, and the
/// amount no vault could cover. Callers must treat a non-zero remainder as
/// insufficient funds.
pub fn discover_outbounds(
    fee: u128,
    max_gas: &Coin,
    item: &TxOutItem,
    vaults: &[Vault],
) -> (Vec<TxOutItem>, u128) {
    let mut outputs = Vec::new();
    let mut remaining = item.coin.amount;

    for vault in vaults {
        if remaining == 0 {
            break;
        }
        let Some(available) = usable_balance(vault, item, fee, max_gas) else {
            continue;
        };
        let take = remaining.min(available);
        let mut output = item.clone().with_vault(vault.pub_key.clone());
        output.coin.amount = take;
        outputs.push(output);
        remaining -= take;
    }
    (outputs, remaining)
}
