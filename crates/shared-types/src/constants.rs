//! # Protocol Constants
//!
//! Compiled-in defaults. Each one can be overridden on chain by a mimir value
//! stored under [`ConstantName::key`].

use crate::common::ONE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConstantName {
    /// Blocks an assigned outbound may stay unsigned before it counts as dangling.
    SigningTransactionPeriod,
    /// Minimum votes for an operational mimir value.
    OperationalVotesMin,
    /// Bond charged per governance vote.
    NativeTransactionFee,
    /// Bond slashed from a banned node.
    BondSlashBan,
    /// Slash points charged per observation, refunded on consensus.
    ObserveSlashPoints,
    /// Slash points for an active node that did not observe.
    LackOfObservationPenalty,
    /// Blocks after consensus during which late observers are refunded.
    ObservationDelayFlexibility,
    /// Tolerated vault/wallet gap in basis points before a chain halts.
    PermittedSolvencyGap,
    /// Fee deducted from each outbound, in the outbound asset.
    OutboundTransactionFee,
    /// Slash points per member of a vault that sent unscheduled funds.
    ExtraFundsSlashPoints,
    /// Blocks between scheduling and signing of an outbound.
    TxOutDelayBlocks,
    /// Max gas headroom over the reported fee, in basis points.
    GasHeadroomBasisPoints,
}

impl ConstantName {
    pub const ALL: [ConstantName; 12] = [
        ConstantName::SigningTransactionPeriod,
        ConstantName::OperationalVotesMin,
        ConstantName::NativeTransactionFee,
        ConstantName::BondSlashBan,
        ConstantName::ObserveSlashPoints,
        ConstantName::LackOfObservationPenalty,
        ConstantName::ObservationDelayFlexibility,
        ConstantName::PermittedSolvencyGap,
        ConstantName::OutboundTransactionFee,
        ConstantName::ExtraFundsSlashPoints,
        ConstantName::TxOutDelayBlocks,
        ConstantName::GasHeadroomBasisPoints,
    ];

    /// Mimir key that overrides this constant.
    pub fn key(&self) -> &'static str {
        match self {
            ConstantName::SigningTransactionPeriod => "SigningTransactionPeriod",
            ConstantName::OperationalVotesMin => "OperationalVotesMin",
            ConstantName::NativeTransactionFee => "NativeTransactionFee",
            ConstantName::BondSlashBan => "BondSlashBan",
            ConstantName::ObserveSlashPoints => "ObserveSlashPoints",
            ConstantName::LackOfObservationPenalty => "LackOfObservationPenalty",
            ConstantName::ObservationDelayFlexibility => "ObservationDelayFlexibility",
            ConstantName::PermittedSolvencyGap => "PermittedSolvencyGap",
            ConstantName::OutboundTransactionFee => "OutboundTransactionFee",
            ConstantName::ExtraFundsSlashPoints => "ExtraFundsSlashPoints",
            ConstantName::TxOutDelayBlocks => "TxOutDelayBlocks",
            ConstantName::GasHeadroomBasisPoints => "GasHeadroomBasisPoints",
        }
    }

    fn default_value(&self) -> i64 {
        match self {
            ConstantName::SigningTransactionPeriod => 300,
            ConstantName::OperationalVotesMin => 3,
            ConstantName::NativeTransactionFee => 2_000_000,
            ConstantName::BondSlashBan => (5_000 * ONE) as i64,
            ConstantName::ObserveSlashPoints => 1,
            ConstantName::LackOfObservationPenalty => 2,
            ConstantName::ObservationDelayFlexibility => 10,
            ConstantName::PermittedSolvencyGap => 100,
            ConstantName::OutboundTransactionFee => 2_000_000,
            ConstantName::ExtraFundsSlashPoints => 20,
            ConstantName::TxOutDelayBlocks => 0,
            ConstantName::GasHeadroomBasisPoints => 15_000,
        }
    }
}

/// Constant table for one network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantValues {
    values: BTreeMap<ConstantName, i64>,
}

impl Default for ConstantValues {
    fn default() -> Self {
        Self {
            values: ConstantName::ALL
                .iter()
                .map(|name| (*name, name.default_value()))
                .collect(),
        }
    }
}

impl ConstantValues {
    pub fn get(&self, name: ConstantName) -> i64 {
        self.values
            .get(&name)
            .copied()
            .unwrap_or_else(|| name.default_value())
    }

    /// Builder-style override, used by node configuration and tests.
    pub fn with(mut self, name: ConstantName, value: i64) -> Self {
        self.values.insert(name, value);
        self
    }
}
