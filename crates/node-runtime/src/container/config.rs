//! # Node Configuration
//!
//! Runtime parameters read from `QB_*` environment variables. Protocol
//! constants are not configured here beyond the two overrides below; the
//! rest follow `ConstantValues::default()` and on-chain mimir.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `QB_BLOCKS_FILE` | `blocks.jsonl` | JSON-lines block file |
//! | `QB_PROTOCOL_VERSION` | `3.0.0` | version assumed for blocks without one |
//! | `QB_SIGNING_PERIOD` | unset | `SigningTransactionPeriod` override |
//! | `QB_OPERATIONAL_VOTES_MIN` | unset | `OperationalVotesMin` override |
//! | `QB_CHANNEL_CAPACITY` | `64` | blocks buffered between reader and executor |

use crate::error::{RuntimeError, RuntimeResult};
use crate::handlers::ProtocolVersion;
use shared_types::{ConstantName, ConstantValues};
use std::path::PathBuf;

pub const DEFAULT_BLOCKS_FILE: &str = "blocks.jsonl";
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeConfig {
    pub blocks_file: PathBuf,
    pub default_version: ProtocolVersion,
    pub signing_period: Option<i64>,
    pub operational_votes_min: Option<i64>,
    pub channel_capacity: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            blocks_file: PathBuf::from(DEFAULT_BLOCKS_FILE),
            default_version: ProtocolVersion::MINIMUM,
            signing_period: None,
            operational_votes_min: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> RuntimeResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> RuntimeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(path) = lookup("QB_BLOCKS_FILE") {
            config.blocks_file = PathBuf::from(path);
        }
        if let Some(version) = lookup("QB_PROTOCOL_VERSION") {
            config.default_version = version.parse()?;
        }
        config.signing_period = parse_var(&lookup, "QB_SIGNING_PERIOD")?;
        config.operational_votes_min = parse_var(&lookup, "QB_OPERATIONAL_VOTES_MIN")?;
        if let Some(capacity) = parse_var::<usize, _>(&lookup, "QB_CHANNEL_CAPACITY")? {
            if capacity == 0 {
                return Err(RuntimeError::Config(
                    "QB_CHANNEL_CAPACITY must be positive".into(),
                ));
            }
            config.channel_capacity = capacity;
        }
        Ok(config)
    }

    /// Protocol constants with this node's overrides applied.
    pub fn constants(&self) -> ConstantValues {
        let mut constants = ConstantValues::default();
        if let Some(period) = self.signing_period {
            constants = constants.with(ConstantName::SigningTransactionPeriod, period);
        }
        if let Some(min) = self.operational_votes_min {
            constants = constants.with(ConstantName::OperationalVotesMin, min);
        }
        constants
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> RuntimeResult<Option<T>>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| RuntimeError::Config(format!("{} is not a valid number: {}", name, raw))),
    }
}
