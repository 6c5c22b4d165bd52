//! GENUSD Proof Records
//!
//! Zero-knowledge proof submissions, structural validation, and commitment
//! records. The proof math itself lives behind the [`ZkVerifier`] trait so a
//! production STARK/SNARK verifier can be substituted without touching the
//! validator; the [`HashCommitmentVerifier`] here mirrors the hash-based
//! placeholder the system ships with.
//!
//! Nullifier and commitment uniqueness are ledger facts: the records produced
//! here are consumed atomically by the ledger commit, which is what makes
//! record-then-accept race-free.

pub mod errors;
pub mod proof;
pub mod verifier;

pub use errors::{ProofError, ProofResult};
pub use proof::{validate_structure, CommitmentRecord, ZkProof, MIN_PROOF_BYTES};
pub use verifier::{compute_commitment, mock_proof, HashCommitmentVerifier, ZkVerifier};
