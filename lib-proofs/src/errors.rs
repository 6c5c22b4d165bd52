//! Proof Errors

use lib_types::CapabilityError;
use thiserror::Error;

/// Error during proof validation or recording.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("Malformed proof: {0}")]
    Malformed(String),

    #[error("Proof rejected by verifier")]
    Invalid,

    #[error("Nullifier {0} already used")]
    NullifierReused(String),

    #[error("Commitment {0} already exists")]
    CommitmentExists(String),

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

/// Result type for proof operations
pub type ProofResult<T> = Result<T, ProofError>;
