//! Transaction Types
//!
//! The three proposed state changes as a sum type. Cardinality that the
//! reference rules demand (Mint has no inputs, Burn has no outputs) is
//! carried by the variant shape itself, not by runtime field checks.

use std::collections::BTreeMap;

use lib_ledger::UtxoMetadata;
use lib_policy::KycLevel;
use lib_types::{Amount, OwnerId, Timestamp, TxId, UtxoId};
use serde::{Deserialize, Serialize};

use crate::errors::EngineResult;

/// Requested output of a Mint or Transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub owner_id: OwnerId,
    pub amount: Amount,
    pub asset_code: String,
    pub kyc_tag: KycLevel,
    pub metadata: UtxoMetadata,
}

/// Variant-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TxBody {
    /// Issue new supply. No inputs by construction.
    Mint { outputs: Vec<OutputSpec> },
    /// Move value between owners; conservation applies exactly.
    Transfer {
        inputs: Vec<UtxoId>,
        outputs: Vec<OutputSpec>,
    },
    /// Redeem supply. No outputs by construction.
    Burn { inputs: Vec<UtxoId> },
}

/// A proposed transaction, exactly as a client submits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub tx_id: TxId,
    pub timestamp: Timestamp,
    /// Policy version the client validated against.
    pub policy_ref: String,
    pub body: TxBody,
    /// Authorization signatures keyed by the signing principal.
    #[serde(default)]
    pub signatures: BTreeMap<OwnerId, Vec<u8>>,
}

impl Transaction {
    pub fn variant_name(&self) -> &'static str {
        match self.body {
            TxBody::Mint { .. } => "mint",
            TxBody::Transfer { .. } => "transfer",
            TxBody::Burn { .. } => "burn",
        }
    }

    pub fn inputs(&self) -> &[UtxoId] {
        match &self.body {
            TxBody::Mint { .. } => &[],
            TxBody::Transfer { inputs, .. } | TxBody::Burn { inputs } => inputs,
        }
    }

    pub fn outputs(&self) -> &[OutputSpec] {
        match &self.body {
            TxBody::Mint { outputs } | TxBody::Transfer { outputs, .. } => outputs,
            TxBody::Burn { .. } => &[],
        }
    }

    /// Sum of requested output amounts, saturating.
    pub fn total_output(&self) -> Amount {
        self.outputs()
            .iter()
            .fold(0, |acc: Amount, o| acc.saturating_add(o.amount))
    }

    /// Canonical byte payload that authorization signatures cover.
    ///
    /// Everything except the signatures themselves, JSON-encoded. BTreeMap
    /// keys and struct field order make the encoding deterministic.
    pub fn signing_payload(&self) -> EngineResult<Vec<u8>> {
        #[derive(Serialize)]
        struct Payload<'a> {
            tx_id: &'a TxId,
            timestamp: Timestamp,
            policy_ref: &'a str,
            body: &'a TxBody,
        }
        Ok(serde_json::to_vec(&Payload {
            tx_id: &self.tx_id,
            timestamp: self.timestamp,
            policy_ref: &self.policy_ref,
            body: &self.body,
        })?)
    }

    pub fn signature_of(&self, principal: &OwnerId) -> Option<&[u8]> {
        self.signatures.get(principal).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(owner: &str, amount: Amount) -> OutputSpec {
        OutputSpec {
            owner_id: OwnerId::new(owner),
            amount,
            asset_code: "GENUSD".to_string(),
            kyc_tag: KycLevel::Level2,
            metadata: UtxoMetadata::new("US", "POLICY_V1.0"),
        }
    }

    #[test]
    fn test_variant_accessors() {
        let mint = Transaction {
            tx_id: TxId::new("MINT1"),
            timestamp: 1,
            policy_ref: "POLICY_V1.0".to_string(),
            body: TxBody::Mint {
                outputs: vec![output("treasury", 100), output("ops", 50)],
            },
            signatures: BTreeMap::new(),
        };
        assert_eq!(mint.variant_name(), "mint");
        assert!(mint.inputs().is_empty());
        assert_eq!(mint.total_output(), 150);

        let burn = Transaction {
            tx_id: TxId::new("BURN1"),
            timestamp: 1,
            policy_ref: "POLICY_V1.0".to_string(),
            body: TxBody::Burn {
                inputs: vec![UtxoId::new(TxId::new("MINT1"), 0)],
            },
            signatures: BTreeMap::new(),
        };
        assert!(burn.outputs().is_empty());
        assert_eq!(burn.inputs().len(), 1);
    }

    #[test]
    fn test_signing_payload_excludes_signatures() {
        let mut tx = Transaction {
            tx_id: TxId::new("TX1"),
            timestamp: 1,
            policy_ref: "POLICY_V1.0".to_string(),
            body: TxBody::Burn {
                inputs: vec![UtxoId::new(TxId::new("MINT1"), 0)],
            },
            signatures: BTreeMap::new(),
        };
        let before = tx.signing_payload().unwrap();
        tx.signatures.insert(OwnerId::new("alice"), vec![1, 2, 3]);
        let after = tx.signing_payload().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_body_serde_tagged() {
        let body = TxBody::Transfer {
            inputs: vec![UtxoId::new(TxId::new("TX0"), 0)],
            outputs: vec![output("bob", 100)],
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"kind\":\"transfer\""));
        let back: TxBody = serde_json::from_str(&json).unwrap();
        assert_eq!(back, body);
    }
}
