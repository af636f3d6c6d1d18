//! # Memos
//!
//! Only the memo kinds the bridge core reasons about are modelled; every
//! other memo is an inbound instruction for the protocol handlers.

use crate::common::TxId;
use crate::errors::{TypesError, TypesResult};
use std::fmt;

/// Parsed transaction memo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Memo {
    /// No memo.
    Empty,
    /// Payment for the inbound with this hash.
    Outbound(TxId),
    /// Refund of the inbound with this hash.
    Refund(TxId),
    /// Vault-to-vault migration during churn, tagged with the churn height.
    Migrate(u64),
    /// Network shutdown payout.
    Ragnarok(u64),
    /// Vault UTXO consolidation.
    Consolidate,
    /// Anything else: handled by the protocol message layer.
    Inbound(String),
}

impl Memo {
    /// Parse a memo. Arbitrary data after `|` is ignored.
    pub fn parse(raw: &str) -> TypesResult<Memo> {
        let body = raw.split('|').next().unwrap_or("").trim();
        if body.is_empty() {
            return Ok(Memo::Empty);
        }
        let mut parts = body.splitn(2, ':');
        let prefix = parts.next().unwrap_or("").to_ascii_uppercase();
        let arg = parts.next().unwrap_or("").trim();

        match prefix.as_str() {
            "OUT" | "OUTBOUND" => Ok(Memo::Outbound(parse_hash(raw, arg)?)),
            "REFUND" => Ok(Memo::Refund(parse_hash(raw, arg)?)),
            "MIGRATE" => Ok(Memo::Migrate(parse_height(raw, arg)?)),
            "RAGNAROK" => Ok(Memo::Ragnarok(parse_height(raw, arg)?)),
            "CONSOLIDATE" => Ok(Memo::Consolidate),
            _ => Ok(Memo::Inbound(body.to_string())),
        }
    }

    /// Memo kinds a vault is allowed to send out with.
    pub fn is_outbound_type(&self) -> bool {
        matches!(
            self,
            Memo::Outbound(_)
                | Memo::Refund(_)
                | Memo::Migrate(_)
                | Memo::Ragnarok(_)
                | Memo::Consolidate
        )
    }

    /// Inbound hash referenced by an outbound or refund memo.
    pub fn in_hash(&self) -> Option<&TxId> {
        match self {
            Memo::Outbound(hash) | Memo::Refund(hash) => Some(hash),
            _ => None,
        }
    }

    /// Internal movements that do not pay an outbound fee.
    pub fn is_fee_exempt(&self) -> bool {
        matches!(self, Memo::Migrate(_) | Memo::Ragnarok(_))
    }
}

impl fmt::Display for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Memo::Empty => Ok(()),
            Memo::Outbound(hash) => write!(f, "OUT:{}", hash),
            Memo::Refund(hash) => write!(f, "REFUND:{}", hash),
            Memo::Migrate(height) => write!(f, "MIGRATE:{}", height),
            Memo::Ragnarok(height) => write!(f, "RAGNAROK:{}", height),
            Memo::Consolidate => f.write_str("CONSOLIDATE"),
            Memo::Inbound(raw) => f.write_str(raw),
        }
    }
}

fn parse_hash(raw: &str, arg: &str) -> TypesResult<TxId> {
    if arg.is_empty() || !arg.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(TypesError::InvalidMemo(raw.to_string()));
    }
    Ok(TxId::new(arg))
}

fn parse_height(raw: &str, arg: &str) -> TypesResult<u64> {
    arg.parse()
        .map_err(|_| TypesError::InvalidMemo(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_outbound_kinds() {
        assert_eq!(
            Memo::parse("out:abc123").unwrap(),
            Memo::Outbound(TxId::new("ABC123"))
        );
        assert_eq!(
            Memo::parse("REFUND:FF|extra data").unwrap(),
            Memo::Refund(TxId::new("FF"))
        );
        assert_eq!(Memo::parse("migrate:42").unwrap(), Memo::Migrate(42));
        assert_eq!(Memo::parse("").unwrap(), Memo::Empty);
        assert!(Memo::parse("OUT:not-hex").is_err());
    }

    #[test]
    fn test_inbound_memo_is_not_outbound_type() {
        let memo = Memo::parse("=:ETH.ETH:0xabc").unwrap();
        assert!(matches!(memo, Memo::Inbound(_)));
        assert!(!memo.is_outbound_type());
        assert!(Memo::Consolidate.is_outbound_type());
    }

    #[test]
    fn test_display_round_trips_outbound() {
        let memo = Memo::Outbound(TxId::new("abcd"));
        assert_eq!(memo.to_string(), "OUT:ABCD");
        assert_eq!(Memo::parse(&memo.to_string()).unwrap(), memo);
    }
}
