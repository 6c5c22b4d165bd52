//! Proof and Commitment Types

use lib_types::{Timestamp, TxId};
use serde::{Deserialize, Serialize};

use crate::errors::{ProofError, ProofResult};

/// Minimum acceptable proof payload size.
pub const MIN_PROOF_BYTES: usize = 32;

/// A zero-knowledge proof submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkProof {
    #[serde(with = "hex_bytes")]
    pub proof_bytes: Vec<u8>,
    pub public_inputs: Vec<String>,
    /// Hiding, binding digest of the private witness.
    pub commitment: String,
    /// One-time token; recorded forever once accepted.
    pub nullifier: String,
    pub timestamp: Timestamp,
}

/// Persisted record of an accepted proof commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentRecord {
    pub commitment: String,
    pub nullifier: String,
    pub timestamp: Timestamp,
    pub used: bool,
    /// Transaction under which the commitment was recorded.
    pub tx_id: TxId,
}

impl CommitmentRecord {
    pub fn from_proof(proof: &ZkProof, tx_id: TxId) -> Self {
        Self {
            commitment: proof.commitment.clone(),
            nullifier: proof.nullifier.clone(),
            timestamp: proof.timestamp,
            used: false,
            tx_id,
        }
    }
}

/// Validate the structure of a proof without touching the ledger or the
/// verifier capability.
pub fn validate_structure(proof: &ZkProof) -> ProofResult<()> {
    if proof.proof_bytes.len() < MIN_PROOF_BYTES {
        return Err(ProofError::Malformed(format!(
            "proof bytes too short: {} < {}",
            proof.proof_bytes.len(),
            MIN_PROOF_BYTES
        )));
    }
    if proof.public_inputs.is_empty() {
        return Err(ProofError::Malformed("no public inputs".to_string()));
    }
    if proof.commitment.is_empty() {
        return Err(ProofError::Malformed("empty commitment".to_string()));
    }
    if proof.nullifier.is_empty() {
        return Err(ProofError::Malformed("empty nullifier".to_string()));
    }
    if proof.timestamp == 0 {
        return Err(ProofError::Malformed("zero timestamp".to_string()));
    }
    Ok(())
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(de)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verifier::mock_proof;

    #[test]
    fn test_structure_accepts_mock() {
        let proof = mock_proof(&["balance>=1000".to_string()], "N1", 1_764_000_000);
        assert!(validate_structure(&proof).is_ok());
    }

    #[test]
    fn test_structure_rejects_short_bytes() {
        let mut proof = mock_proof(&["x".to_string()], "N1", 1);
        proof.proof_bytes.truncate(8);
        assert!(matches!(
            validate_structure(&proof),
            Err(ProofError::Malformed(_))
        ));
    }

    #[test]
    fn test_structure_rejects_missing_fields() {
        let base = mock_proof(&["x".to_string()], "N1", 1);

        let mut p = base.clone();
        p.public_inputs.clear();
        assert!(validate_structure(&p).is_err());

        let mut p = base.clone();
        p.commitment.clear();
        assert!(validate_structure(&p).is_err());

        let mut p = base.clone();
        p.nullifier.clear();
        assert!(validate_structure(&p).is_err());

        let mut p = base;
        p.timestamp = 0;
        assert!(validate_structure(&p).is_err());
    }

    #[test]
    fn test_proof_json_roundtrip_hex_bytes() {
        let proof = mock_proof(&["input".to_string()], "N1", 5);
        let json = serde_json::to_string(&proof).unwrap();
        assert!(json.contains("proof_bytes"));
        let back: ZkProof = serde_json::from_str(&json).unwrap();
        assert_eq!(back, proof);
    }
}
