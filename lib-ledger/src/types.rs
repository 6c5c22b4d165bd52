//! UTXO Record Types

use lib_policy::KycLevel;
use lib_types::{Amount, OwnerId, Timestamp, UtxoId};
use serde::{Deserialize, Serialize};

/// UTXO lifecycle state.
///
/// `Active -> Spent` on an accepted Transfer/Burn input; `Active <-> Frozen`
/// only via admin action; `Spent` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UtxoStatus {
    Active,
    Frozen,
    Spent,
}

impl std::fmt::Display for UtxoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UtxoStatus::Active => "active",
            UtxoStatus::Frozen => "frozen",
            UtxoStatus::Spent => "spent",
        };
        f.write_str(s)
    }
}

/// Compliance and policy metadata attached to a UTXO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoMetadata {
    pub jurisdiction: String,
    pub blacklist_flag: bool,
    pub freeze_reason: Option<String>,
    pub policy_version: String,
    pub issuer_attestation: String,
}

impl UtxoMetadata {
    pub fn new(jurisdiction: impl Into<String>, policy_version: impl Into<String>) -> Self {
        Self {
            jurisdiction: jurisdiction.into(),
            blacklist_flag: false,
            freeze_reason: None,
            policy_version: policy_version.into(),
            issuer_attestation: String::new(),
        }
    }
}

/// Unspent (or spent/frozen) transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub utxo_id: UtxoId,
    pub owner_id: OwnerId,
    pub asset_code: String,
    pub amount: Amount,
    pub status: UtxoStatus,
    /// KYC level in effect when the output was created.
    pub kyc_tag: KycLevel,
    pub created_at: Timestamp,
    pub metadata: UtxoMetadata,
}

impl Utxo {
    pub fn is_active(&self) -> bool {
        self.status == UtxoStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::TxId;

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&UtxoStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::from_str::<UtxoStatus>("\"spent\"").unwrap(),
            UtxoStatus::Spent
        );
    }

    #[test]
    fn test_utxo_json_roundtrip() {
        let utxo = Utxo {
            utxo_id: UtxoId::new(TxId::new("TX1"), 0),
            owner_id: OwnerId::new("treasury"),
            asset_code: "GENUSD".to_string(),
            amount: 100_000,
            status: UtxoStatus::Active,
            kyc_tag: KycLevel::Level3,
            created_at: 1_764_000_000,
            metadata: UtxoMetadata::new("US", "POLICY_V1.0"),
        };
        let json = serde_json::to_string(&utxo).unwrap();
        let back: Utxo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, utxo);
    }
}
