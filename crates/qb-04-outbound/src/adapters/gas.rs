//! Gas pricing adapters.

use crate::error::{OutboundError, OutboundResult};
use crate::ports::GasManager;
use parking_lot::RwLock;
use qb_01_keeper::Keeper;
use shared_types::{Asset, Chain, Coin, ConstantName};
use std::collections::BTreeMap;

const BASIS_POINTS: u128 = 10_000;

/// Prices gas from the `NetworkFee` records reported by observers.
///
/// Max gas is `transaction_size * transaction_fee_rate` scaled by
/// `GasHeadroomBasisPoints`. The outbound fee is the flat
/// `OutboundTransactionFee` constant.
#[derive(Clone, Copy, Debug, Default)]
pub struct NetworkFeeGasManager;

impl GasManager for NetworkFeeGasManager {
    fn max_gas(&self, keeper: &Keeper, chain: &Chain) -> OutboundResult<Coin> {
        let fee = keeper
            .get_network_fee(chain)?
            .ok_or_else(|| OutboundError::GasUnavailable {
                chain: chain.clone(),
            })?;
        let headroom = u128::try_from(keeper.config_i64(ConstantName::GasHeadroomBasisPoints)?)
            .unwrap_or(BASIS_POINTS);
        let base = u128::from(fee.transaction_size).saturating_mul(u128::from(fee.transaction_fee_rate));
        Ok(Coin::new(
            chain.gas_asset(),
            base.saturating_mul(headroom) / BASIS_POINTS,
        ))
    }

    fn gas_rate(&self, keeper: &Keeper, chain: &Chain) -> OutboundResult<u64> {
        Ok(keeper
            .get_network_fee(chain)?
            .map(|fee| fee.transaction_fee_rate)
            .unwrap_or(0))
    }

    fn outbound_fee(&self, keeper: &Keeper, _asset: &Asset) -> OutboundResult<u128> {
        let fee = keeper.config_i64(ConstantName::OutboundTransactionFee)?;
        Ok(u128::try_from(fee).unwrap_or(0))
    }
}

#[derive(Clone, Debug)]
struct ChainGas {
    max_gas: u128,
    rate: u64,
}

/// Fixed gas table, adjustable at runtime.
#[derive(Debug, Default)]
pub struct FixedGasManager {
    chains: RwLock<BTreeMap<Chain, ChainGas>>,
    fee: RwLock<u128>,
}

impl FixedGasManager {
    pub fn new(fee: u128) -> Self {
        Self {
            chains: RwLock::new(BTreeMap::new()),
            fee: RwLock::new(fee),
        }
    }

    pub fn with_chain(self, chain: Chain, max_gas: u128, rate: u64) -> Self {
        self.set_chain(chain, max_gas, rate);
        self
    }

    pub fn set_chain(&self, chain: Chain, max_gas: u128, rate: u64) {
        self.chains.write().insert(chain, ChainGas { max_gas, rate });
    }

    pub fn set_fee(&self, fee: u128) {
        *self.fee.write() = fee;
    }
}

impl GasManager for FixedGasManager {
    fn max_gas(&self, _keeper: &Keeper, chain: &Chain) -> OutboundResult<Coin> {
        self.chains
            .read()
            .get(chain)
            .map(|gas| Coin::new(chain.gas_asset(), gas.max_gas))
            .ok_or_else(|| OutboundError::GasUnavailable {
                chain: chain.clone(),
            })
    }

    fn gas_rate(&self, _keeper: &Keeper, chain: &Chain) -> OutboundResult<u64> {
        Ok(self.chains.read().get(chain).map(|gas| gas.rate).unwrap_or(0))
    }

    fn outbound_fee(&self, _keeper: &Keeper, _asset: &Asset) -> OutboundResult<u128> {
        Ok(*self.fee.read())
    }
}
