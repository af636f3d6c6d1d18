//! # Insolvency Check
//!
//! Compares what the network believes a vault holds against what its wallet
//! actually holds on one chain. The vault balance is the baseline: a wallet
//! holding more than the vault is fine.

use shared_types::{Chain, Coins};
use tracing::info;

/// Gas-asset balances at or below this multiple of max gas are not checked.
const GAS_DUST_MULTIPLE: u128 = 10;

/// `vault` should already exclude outbounds it has been assigned but not
/// sent. `max_gas` is the chain's current max gas, when known.
pub fn is_insolvent(
    vault: &Coins,
    wallet: &Coins,
    chain: &Chain,
    max_gas: Option<u128>,
    permitted_gap_bps: u128,
) -> bool {
    for coin in vault.iter().filter(|c| &c.asset.chain == chain && !c.is_empty()) {
        let held = wallet.get(&coin.asset);
        if held == 0 {
            info!(asset = %coin.asset, amount = coin.amount, "[qb-05] Asset missing from wallet");
            return true;
        }
        if coin.asset.is_gas_asset() {
            if let Some(gas) = max_gas {
                if coin.amount <= gas.saturating_mul(GAS_DUST_MULTIPLE) {
                    continue;
                }
            }
        }
        if coin.amount > held {
            let gap = coin.amount - held;
            let permitted = held.saturating_mul(permitted_gap_bps) / 10_000;
            if gap > permitted {
                info!(
                    asset = %coin.asset,
                    vault = coin.amount,
                    wallet = held,
                    gap,
                    "[qb-05] Vault holds more than wallet"
                );
                return true;
            }
        }
    }
    false
}
