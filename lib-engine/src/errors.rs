//! Engine Reject Taxonomy
//!
//! Every way a submission can fail, as machine-readable variants. Only
//! [`EngineError::Conflict`] and [`EngineError::ServiceUnavailable`] are
//! transient; everything else is fatal for the submitted transaction and
//! must not be retried against the same snapshot.

use lib_ledger::LedgerError;
use lib_policy::PolicyError;
use lib_proofs::ProofError;
use lib_reserve::ReserveError;
use lib_types::{Amount, CapabilityError, TxId, UtxoId};
use thiserror::Error;

/// Rejection or failure of an engine operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Schema violation: {0}")]
    Schema(String),

    #[error("Unknown policy: {0}")]
    UnknownPolicy(String),

    #[error("UTXO not found: {0}")]
    NotFound(UtxoId),

    #[error("UTXO already spent: {0}")]
    AlreadySpent(UtxoId),

    #[error("UTXO is frozen: {0}")]
    FrozenUtxo(UtxoId),

    #[error("UTXO {0} is not frozen")]
    NotFrozen(UtxoId),

    #[error("Authorization failed: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Reserve(#[from] ReserveError),

    #[error("Mint limit exceeded: requested {requested}, per-tx limit {limit}")]
    MintLimitExceeded { requested: Amount, limit: Amount },

    #[error("Conservation violation: inputs {inputs} != outputs {outputs}")]
    ConservationViolation { inputs: Amount, outputs: Amount },

    #[error("Burn below minimum: amount {amount}, minimum {minimum}")]
    BelowMinimumBurn { amount: Amount, minimum: Amount },

    #[error("Malformed proof: {0}")]
    MalformedProof(String),

    #[error("Proof rejected by verifier")]
    InvalidProof,

    #[error("Nullifier already used: {0}")]
    NullifierReused(String),

    #[error("Commitment already recorded: {0}")]
    CommitmentExists(String),

    #[error("Transaction already committed: {0}")]
    DuplicateTransaction(TxId),

    #[error("Commit conflict after {attempts} attempt(s)")]
    Conflict { attempts: u32 },

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl EngineError {
    /// Whether the caller may safely re-validate and retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EngineError::Conflict { .. } | EngineError::ServiceUnavailable(_)
        )
    }
}

impl From<CapabilityError> for EngineError {
    fn from(err: CapabilityError) -> Self {
        EngineError::ServiceUnavailable(err.to_string())
    }
}

impl From<ProofError> for EngineError {
    fn from(err: ProofError) -> Self {
        match err {
            ProofError::Malformed(reason) => EngineError::MalformedProof(reason),
            ProofError::Invalid => EngineError::InvalidProof,
            ProofError::NullifierReused(n) => EngineError::NullifierReused(n),
            ProofError::CommitmentExists(c) => EngineError::CommitmentExists(c),
            ProofError::Capability(cap) => cap.into(),
        }
    }
}

impl From<LedgerError> for EngineError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NullifierExists(n) => EngineError::NullifierReused(n),
            LedgerError::CommitmentExists(c) => EngineError::CommitmentExists(c),
            LedgerError::DuplicateTx(tx_id) => EngineError::DuplicateTransaction(tx_id),
            other => EngineError::Storage(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Storage(format!("encoding failure: {err}"))
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
