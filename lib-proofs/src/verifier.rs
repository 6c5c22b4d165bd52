//! Proof Verification Capability
//!
//! The [`ZkVerifier`] trait is the seam where real STARK/SNARK verification
//! plugs in. The engine never depends on a proof system; it depends on this
//! trait.

use lib_types::CapabilityError;
use sha3::{Digest, Sha3_256, Sha3_512};
use tracing::debug;

use crate::proof::ZkProof;

const COMMITMENT_DOMAIN: &[u8] = b"STARK_COMMITMENT_V1";
const MOCK_PROOF_DOMAIN: &[u8] = b"MOCK_STARK_PROOF";

/// Cryptographic proof validity capability.
///
/// `Ok(true)` means the proof verifies; `Ok(false)` means it is invalid;
/// `Err` means the capability itself failed (treated as transient).
pub trait ZkVerifier: Send + Sync {
    fn verify(&self, proof: &ZkProof) -> Result<bool, CapabilityError>;
}

/// Commitment digest over the public inputs and nullifier.
///
/// SHA3-256 over a domain tag, each public input, then the nullifier.
pub fn compute_commitment(public_inputs: &[String], nullifier: &str) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(COMMITMENT_DOMAIN);
    for input in public_inputs {
        hasher.update(input.as_bytes());
    }
    hasher.update(nullifier.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hash-commitment verifier.
///
/// Recomputes the commitment from the public inputs and nullifier and
/// requires it to match the proof's claimed commitment. This checks binding,
/// not zero-knowledge soundness; production deployments substitute a real
/// verifier behind the same trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashCommitmentVerifier;

impl ZkVerifier for HashCommitmentVerifier {
    fn verify(&self, proof: &ZkProof) -> Result<bool, CapabilityError> {
        let expected = compute_commitment(&proof.public_inputs, &proof.nullifier);
        if expected != proof.commitment {
            debug!(
                nullifier = %proof.nullifier,
                "claimed commitment does not match the public inputs"
            );
            return Ok(false);
        }
        Ok(true)
    }
}

/// Deterministic proof fixture whose commitment satisfies
/// [`HashCommitmentVerifier`]. Used by tests and demos.
pub fn mock_proof(public_inputs: &[String], nullifier: &str, timestamp: u64) -> ZkProof {
    let mut hasher = Sha3_512::new();
    hasher.update(MOCK_PROOF_DOMAIN);
    for input in public_inputs {
        hasher.update(input.as_bytes());
    }
    hasher.update(nullifier.as_bytes());
    let proof_bytes = hasher.finalize().to_vec();

    ZkProof {
        proof_bytes,
        public_inputs: public_inputs.to_vec(),
        commitment: compute_commitment(public_inputs, nullifier),
        nullifier: nullifier.to_string(),
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_proof_verifies() {
        let proof = mock_proof(&["reserves>=supply".to_string()], "N1", 100);
        let verifier = HashCommitmentVerifier;
        assert_eq!(verifier.verify(&proof), Ok(true));
    }

    #[test]
    fn test_tampered_commitment_fails() {
        let mut proof = mock_proof(&["reserves>=supply".to_string()], "N1", 100);
        proof.commitment = "deadbeef".to_string();
        let verifier = HashCommitmentVerifier;
        assert_eq!(verifier.verify(&proof), Ok(false));
    }

    #[test]
    fn test_tampered_inputs_fail() {
        let mut proof = mock_proof(&["balance>=1000".to_string()], "N1", 100);
        proof.public_inputs[0] = "balance>=1".to_string();
        let verifier = HashCommitmentVerifier;
        assert_eq!(verifier.verify(&proof), Ok(false));
    }

    #[test]
    fn test_commitment_deterministic() {
        let a = compute_commitment(&["x".to_string(), "y".to_string()], "N7");
        let b = compute_commitment(&["x".to_string(), "y".to_string()], "N7");
        let c = compute_commitment(&["x".to_string(), "y".to_string()], "N8");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
