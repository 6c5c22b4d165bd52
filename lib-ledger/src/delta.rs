//! Ledger Delta
//!
//! The validated effect of one transaction, ready to commit. Validation
//! produces a delta plus the read set it was computed against; the store
//! applies the delta atomically only if every read-set version still holds.

use lib_proofs::CommitmentRecord;
use lib_types::{Timestamp, TxId, UtxoId, Version};
use serde::{Deserialize, Serialize};

use crate::types::Utxo;

/// One observed (identifier, version) pair from validation.
///
/// Commit re-checks these under the write lock; any mismatch means another
/// transaction touched the same state in between and the delta must not land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadSetEntry {
    pub utxo_id: UtxoId,
    pub version: Version,
}

impl ReadSetEntry {
    pub fn new(utxo_id: UtxoId, version: Version) -> Self {
        Self { utxo_id, version }
    }
}

/// Complete state effect of one validated transaction.
///
/// A delta is inert data: building one performs no store mutation. All its
/// parts land together in [`crate::store::LedgerStore::commit`] or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerDelta {
    pub tx_id: TxId,
    pub timestamp: Timestamp,
    /// Inputs to mark spent.
    pub spend: Vec<UtxoId>,
    /// New outputs to create.
    pub create: Vec<Utxo>,
    /// UTXOs to freeze, with the stated reason.
    pub freeze: Vec<(UtxoId, String)>,
    /// UTXOs to return to active.
    pub unfreeze: Vec<UtxoId>,
    /// Signed change to total supply: positive for mints, negative for burns,
    /// zero for transfers.
    pub supply_delta: i128,
    /// Nullifiers to record permanently.
    pub nullifiers: Vec<String>,
    /// Proof commitments to record alongside the transaction.
    pub commitments: Vec<CommitmentRecord>,
}

impl LedgerDelta {
    /// An empty delta for the given transaction; callers fill in the effects.
    pub fn new(tx_id: TxId, timestamp: Timestamp) -> Self {
        Self {
            tx_id,
            timestamp,
            spend: Vec::new(),
            create: Vec::new(),
            freeze: Vec::new(),
            unfreeze: Vec::new(),
            supply_delta: 0,
            nullifiers: Vec::new(),
            commitments: Vec::new(),
        }
    }

    /// True when the delta would not change any state.
    pub fn is_empty(&self) -> bool {
        self.spend.is_empty()
            && self.create.is_empty()
            && self.freeze.is_empty()
            && self.unfreeze.is_empty()
            && self.supply_delta == 0
            && self.nullifiers.is_empty()
            && self.commitments.is_empty()
    }
}
