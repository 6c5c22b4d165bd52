//! Ledger Store Trait
//!
//! Abstract interface over the persisted ledger. The validation pipeline and
//! the engine facade are written against this trait; tests use the in-memory
//! implementation and deployments use the sled-backed one.

use lib_proofs::CommitmentRecord;
use lib_types::{Amount, OwnerId, TxId, UtxoId, Version};

use crate::delta::{LedgerDelta, ReadSetEntry};
use crate::errors::LedgerResult;
use crate::history::HistoryEntry;
use crate::types::Utxo;

/// Why a commit did not land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictInfo {
    /// First read-set entry whose version no longer matched.
    pub utxo_id: UtxoId,
    /// Version the validator observed.
    pub expected: Version,
    /// Version found at commit time; `None` if the record vanished.
    pub found: Option<Version>,
}

/// Result of attempting to commit a delta.
///
/// `Conflict` is transient: the caller may re-validate against fresh state
/// and try again. Fatal problems (duplicate nullifier, supply underflow)
/// surface as [`crate::errors::LedgerError`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    Conflict(ConflictInfo),
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed)
    }
}

/// Versioned, append-friendly ledger state store.
///
/// # Key Rules
///
/// 1. `commit` is atomic: all read-set checks and all writes happen under
///    one critical section per store
/// 2. Nullifiers and commitments are monotone sets: recorded once, kept
///    forever, never overwritten
/// 3. Spent UTXOs stay readable with `status == Spent`
pub trait LedgerStore: Send + Sync {
    /// Fetch a UTXO and its current version, spent or not.
    fn get_utxo(&self, id: &UtxoId) -> LedgerResult<Option<(Utxo, Version)>>;

    /// Current total circulating supply.
    fn total_supply(&self) -> LedgerResult<Amount>;

    /// Whether a nullifier has ever been recorded.
    fn nullifier_used(&self, nullifier: &str) -> LedgerResult<bool>;

    /// Fetch a recorded proof commitment, if any.
    fn commitment(&self, commitment: &str) -> LedgerResult<Option<CommitmentRecord>>;

    /// Whether a transaction id has already been committed.
    fn tx_exists(&self, tx_id: &TxId) -> LedgerResult<bool>;

    /// All UTXOs owned by `owner`, in unspecified order.
    fn owner_utxos(&self, owner: &OwnerId) -> LedgerResult<Vec<Utxo>>;

    /// Sum of the owner's active UTXO amounts.
    fn balance(&self, owner: &OwnerId) -> LedgerResult<Amount> {
        let total = self
            .owner_utxos(owner)?
            .iter()
            .filter(|u| u.is_active())
            .map(|u| u.amount)
            .sum();
        Ok(total)
    }

    /// The owner's history entries in append order.
    fn history(&self, owner: &OwnerId) -> LedgerResult<Vec<HistoryEntry>>;

    /// Atomically apply the delta if every read-set version still holds.
    ///
    /// # Returns
    /// * `Ok(CommitOutcome::Committed)` - delta fully applied
    /// * `Ok(CommitOutcome::Conflict(_))` - a version moved; nothing applied
    /// * `Err(_)` - fatal (duplicate nullifier/commitment/UTXO/tx, supply
    ///   bounds, storage failure); nothing applied
    fn commit(&self, delta: &LedgerDelta, read_set: &[ReadSetEntry])
        -> LedgerResult<CommitOutcome>;
}
