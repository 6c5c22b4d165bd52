//! Primitive Types for Ledger State
//!
//! These types are the foundational building blocks for all ledger-critical
//! data structures. They are designed to be:
//! - Deterministically serializable
//! - Cheap to compare and hash
//! - Unambiguous in persisted keys (no raw `String` in store code)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// TYPE ALIASES
// ============================================================================

/// Token amounts in integer cents (no fractional units).
pub type Amount = u64;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Per-key store version, bumped on every mutation.
pub type Version = u64;

/// Error parsing an identifier from its string form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("Malformed UTXO id: {0}")]
    MalformedUtxoId(String),

    #[error("Empty identifier")]
    Empty,
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Opaque principal identity (issuer, auditor, or wallet owner).
///
/// Identity strings come from the external enrollment collaborator; the
/// engine never inspects their structure.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerId({})", self.0)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ============================================================================
// TRANSACTION / OUTPUT IDENTIFIERS
// ============================================================================

/// Client-supplied transaction identifier.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", self.0)
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TxId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Reference to a specific output of a transaction.
///
/// Canonical string form is `"{tx_id}:{output_index}"`; the index is the
/// position of the output in the creating transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtxoId {
    pub tx_id: TxId,
    pub output_index: u32,
}

impl UtxoId {
    pub fn new(tx_id: TxId, output_index: u32) -> Self {
        Self { tx_id, output_index }
    }
}

impl fmt::Display for UtxoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_id, self.output_index)
    }
}

impl FromStr for UtxoId {
    type Err = IdError;

    /// Parse from the canonical `"{tx_id}:{output_index}"` form.
    ///
    /// The index is everything after the last `:` so transaction ids may
    /// themselves contain colons (x509-derived ids do).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tx, idx) = s
            .rsplit_once(':')
            .ok_or_else(|| IdError::MalformedUtxoId(s.to_string()))?;
        if tx.is_empty() {
            return Err(IdError::MalformedUtxoId(s.to_string()));
        }
        let output_index = idx
            .parse::<u32>()
            .map_err(|_| IdError::MalformedUtxoId(s.to_string()))?;
        Ok(Self::new(TxId::new(tx), output_index))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utxo_id_display_roundtrip() {
        let id = UtxoId::new(TxId::new("MINT_20251128_001"), 3);
        let shown = id.to_string();
        assert_eq!(shown, "MINT_20251128_001:3");
        let parsed: UtxoId = shown.parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_utxo_id_tx_with_colons() {
        // x509-style ids contain colons; only the last one separates the index
        let parsed: UtxoId = "x509::/C=US/CN=treasury:0".parse().unwrap();
        assert_eq!(parsed.tx_id.as_str(), "x509::/C=US/CN=treasury");
        assert_eq!(parsed.output_index, 0);
    }

    #[test]
    fn test_utxo_id_malformed() {
        assert!("no-index".parse::<UtxoId>().is_err());
        assert!(":5".parse::<UtxoId>().is_err());
        assert!("tx:notanumber".parse::<UtxoId>().is_err());
    }

    #[test]
    fn test_owner_id_serde_transparent() {
        let owner = OwnerId::new("x509::/C=US/CN=merchant");
        let json = serde_json::to_string(&owner).unwrap();
        assert_eq!(json, "\"x509::/C=US/CN=merchant\"");
        let back: OwnerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, owner);
    }
}
