//! Ledger Store Errors

use lib_types::{TxId, UtxoId};
use thiserror::Error;

/// Error during ledger store operations.
///
/// Version mismatches are not errors: they surface as
/// [`crate::store::CommitOutcome::Conflict`], which is transient and
/// retryable. Everything here is fatal for the submitted delta.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("UTXO already exists: {0}")]
    DuplicateUtxo(UtxoId),

    #[error("Transaction already recorded: {0}")]
    DuplicateTx(TxId),

    #[error("Nullifier already recorded: {0}")]
    NullifierExists(String),

    #[error("Commitment already recorded: {0}")]
    CommitmentExists(String),

    #[error("Supply overflow")]
    SupplyOverflow,

    #[error("Supply underflow: supply {supply}, delta {delta}")]
    SupplyUnderflow { supply: u64, delta: i128 },

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sled::Error> for LedgerError {
    fn from(err: sled::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Codec(err.to_string())
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
