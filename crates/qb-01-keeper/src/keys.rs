//! Key layout.
//!
//! Every record lives under a textual prefix. Heights are appended
//! big-endian so a prefix scan walks buckets in height order.

pub const NODE_ACCOUNT: &str = "node/";
pub const VAULT: &str = "vault/";
pub const TX_OUT: &str = "txout/";
pub const MIMIR: &str = "mimir/";
pub const NODE_MIMIR: &str = "node_mimir/";
pub const LAST_CHAIN_HEIGHT: &str = "last_chain_height/";
pub const NETWORK_FEE: &str = "network_fee/";
pub const RESERVE: &str = "reserve";

pub const OBSERVED_TX_IN_VOTER: &str = "observed_in/";
pub const OBSERVED_TX_OUT_VOTER: &str = "observed_out/";
pub const BAN_VOTER: &str = "ban/";
pub const ERRATA_VOTER: &str = "errata/";
pub const SOLVENCY_VOTER: &str = "solvency/";

/// `prefix` followed by a textual id.
pub fn key(prefix: &str, id: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(prefix.len() + id.len());
    out.extend_from_slice(prefix.as_bytes());
    out.extend_from_slice(id.as_bytes());
    out
}

/// `prefix` followed by the big-endian height.
pub fn height_key(prefix: &str, height: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(prefix.len() + 8);
    out.extend_from_slice(prefix.as_bytes());
    out.extend_from_slice(&height.to_be_bytes());
    out
}

/// Inverse of [`height_key`].
pub fn decode_height(prefix: &str, raw: &[u8]) -> Option<u64> {
    let tail = raw.strip_prefix(prefix.as_bytes())?;
    let bytes: [u8; 8] = tail.try_into().ok()?;
    Some(u64::from_be_bytes(bytes))
}

/// Printable form of a key for logs and errors.
pub fn display(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}
