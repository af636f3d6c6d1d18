//! # Version Strategy
//!
//! Every block names the protocol version it was produced under. The
//! executor resolves a [`HandlerStrategy`] once per block and routes each
//! message through it, so a behaviour change ships as a new variant instead
//! of a branch inside a handler.

use crate::error::{RuntimeError, RuntimeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `major.minor.patch`, ordered numerically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProtocolVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ProtocolVersion {
    /// Oldest version this node can execute.
    pub const MINIMUM: ProtocolVersion = ProtocolVersion::new(3, 0, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for ProtocolVersion {
    type Err = RuntimeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || RuntimeError::InvalidVersion(raw.to_string());
        let mut parts = raw.trim().trim_start_matches('v').split('.');
        let mut next = || -> RuntimeResult<u32> {
            parts
                .next()
                .ok_or_else(invalid)?
                .parse()
                .map_err(|_| invalid())
        };
        let version = ProtocolVersion::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

impl TryFrom<String> for ProtocolVersion {
    type Error = RuntimeError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<ProtocolVersion> for String {
    fn from(version: ProtocolVersion) -> Self {
        version.to_string()
    }
}

/// Handler set for one block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandlerStrategy {
    V3,
}

impl HandlerStrategy {
    pub fn resolve(version: ProtocolVersion) -> RuntimeResult<Self> {
        if version < ProtocolVersion::MINIMUM {
            return Err(RuntimeError::UnsupportedVersion {
                version: version.to_string(),
                minimum: ProtocolVersion::MINIMUM.to_string(),
            });
        }
        Ok(HandlerStrategy::V3)
    }
}
