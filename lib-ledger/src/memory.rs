//! In-memory Ledger Store
//!
//! Single `RwLock` over the whole state. Commit takes the write lock once,
//! runs every check, and only then mutates, so a delta can never land
//! partially.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use tracing::debug;

use lib_proofs::CommitmentRecord;
use lib_types::{Amount, OwnerId, TxId, UtxoId, Version};

use crate::delta::{LedgerDelta, ReadSetEntry};
use crate::errors::{LedgerError, LedgerResult};
use crate::history::{HistoryEntry, HistoryKind};
use crate::store::{CommitOutcome, ConflictInfo, LedgerStore};
use crate::types::{Utxo, UtxoStatus};

#[derive(Default)]
struct Inner {
    utxos: HashMap<UtxoId, (Utxo, Version)>,
    total_supply: Amount,
    nullifiers: HashSet<String>,
    commitments: HashMap<String, CommitmentRecord>,
    txs: HashSet<TxId>,
    history: HashMap<OwnerId, Vec<HistoryEntry>>,
}

/// Non-durable store for tests and single-process deployments.
#[derive(Default)]
pub struct MemoryLedgerStore {
    inner: RwLock<Inner>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    /// All fatal and transient checks, before any mutation.
    fn check(
        &self,
        delta: &LedgerDelta,
        read_set: &[ReadSetEntry],
    ) -> LedgerResult<Option<ConflictInfo>> {
        for entry in read_set {
            let found = self.utxos.get(&entry.utxo_id).map(|(_, v)| *v);
            if found != Some(entry.version) {
                return Ok(Some(ConflictInfo {
                    utxo_id: entry.utxo_id.clone(),
                    expected: entry.version,
                    found,
                }));
            }
        }

        if self.txs.contains(&delta.tx_id) {
            return Err(LedgerError::DuplicateTx(delta.tx_id.clone()));
        }
        for utxo in &delta.create {
            if self.utxos.contains_key(&utxo.utxo_id) {
                return Err(LedgerError::DuplicateUtxo(utxo.utxo_id.clone()));
            }
        }
        for nullifier in &delta.nullifiers {
            if self.nullifiers.contains(nullifier) {
                return Err(LedgerError::NullifierExists(nullifier.clone()));
            }
        }
        for record in &delta.commitments {
            if self.commitments.contains_key(&record.commitment) {
                return Err(LedgerError::CommitmentExists(record.commitment.clone()));
            }
        }

        checked_supply(self.total_supply, delta.supply_delta)?;
        Ok(None)
    }

    fn push_history(&mut self, owner: &OwnerId, entry: HistoryEntry) {
        self.history.entry(owner.clone()).or_default().push(entry);
    }
}

/// New supply after applying a signed delta, or the bound that was violated.
pub(crate) fn checked_supply(supply: Amount, delta: i128) -> LedgerResult<Amount> {
    let next = supply as i128 + delta;
    if next < 0 {
        return Err(LedgerError::SupplyUnderflow { supply, delta });
    }
    if next > Amount::MAX as i128 {
        return Err(LedgerError::SupplyOverflow);
    }
    Ok(next as Amount)
}

impl LedgerStore for MemoryLedgerStore {
    fn get_utxo(&self, id: &UtxoId) -> LedgerResult<Option<(Utxo, Version)>> {
        Ok(self.inner.read().utxos.get(id).cloned())
    }

    fn total_supply(&self) -> LedgerResult<Amount> {
        Ok(self.inner.read().total_supply)
    }

    fn nullifier_used(&self, nullifier: &str) -> LedgerResult<bool> {
        Ok(self.inner.read().nullifiers.contains(nullifier))
    }

    fn commitment(&self, commitment: &str) -> LedgerResult<Option<CommitmentRecord>> {
        Ok(self.inner.read().commitments.get(commitment).cloned())
    }

    fn tx_exists(&self, tx_id: &TxId) -> LedgerResult<bool> {
        Ok(self.inner.read().txs.contains(tx_id))
    }

    fn owner_utxos(&self, owner: &OwnerId) -> LedgerResult<Vec<Utxo>> {
        let inner = self.inner.read();
        Ok(inner
            .utxos
            .values()
            .filter(|(u, _)| &u.owner_id == owner)
            .map(|(u, _)| u.clone())
            .collect())
    }

    fn history(&self, owner: &OwnerId) -> LedgerResult<Vec<HistoryEntry>> {
        Ok(self
            .inner
            .read()
            .history
            .get(owner)
            .cloned()
            .unwrap_or_default())
    }

    fn commit(
        &self,
        delta: &LedgerDelta,
        read_set: &[ReadSetEntry],
    ) -> LedgerResult<CommitOutcome> {
        let mut inner = self.inner.write();

        if let Some(conflict) = inner.check(delta, read_set)? {
            debug!(
                tx_id = %delta.tx_id,
                utxo_id = %conflict.utxo_id,
                expected = conflict.expected,
                "Commit conflict, read-set version moved"
            );
            return Ok(CommitOutcome::Conflict(conflict));
        }

        // Checks passed; every mutation below is infallible on this state
        // except spend/freeze targets, which the read set already pinned.
        for id in &delta.spend {
            let (utxo, version) = inner
                .utxos
                .get_mut(id)
                .ok_or_else(|| LedgerError::Storage(format!("missing spend target {id}")))?;
            utxo.status = UtxoStatus::Spent;
            *version += 1;
            let entry = HistoryEntry {
                tx_id: delta.tx_id.clone(),
                timestamp: delta.timestamp,
                utxo_id: id.clone(),
                kind: HistoryKind::Spent,
                amount: utxo.amount,
            };
            let owner = utxo.owner_id.clone();
            inner.push_history(&owner, entry);
        }

        for utxo in &delta.create {
            inner.utxos.insert(utxo.utxo_id.clone(), (utxo.clone(), 1));
            let entry = HistoryEntry {
                tx_id: delta.tx_id.clone(),
                timestamp: delta.timestamp,
                utxo_id: utxo.utxo_id.clone(),
                kind: HistoryKind::Created,
                amount: utxo.amount,
            };
            inner.push_history(&utxo.owner_id, entry);
        }

        for (id, reason) in &delta.freeze {
            let (utxo, version) = inner
                .utxos
                .get_mut(id)
                .ok_or_else(|| LedgerError::Storage(format!("missing freeze target {id}")))?;
            utxo.status = UtxoStatus::Frozen;
            utxo.metadata.freeze_reason = Some(reason.clone());
            *version += 1;
            let entry = HistoryEntry {
                tx_id: delta.tx_id.clone(),
                timestamp: delta.timestamp,
                utxo_id: id.clone(),
                kind: HistoryKind::Frozen,
                amount: utxo.amount,
            };
            let owner = utxo.owner_id.clone();
            inner.push_history(&owner, entry);
        }

        for id in &delta.unfreeze {
            let (utxo, version) = inner
                .utxos
                .get_mut(id)
                .ok_or_else(|| LedgerError::Storage(format!("missing unfreeze target {id}")))?;
            utxo.status = UtxoStatus::Active;
            utxo.metadata.freeze_reason = None;
            *version += 1;
            let entry = HistoryEntry {
                tx_id: delta.tx_id.clone(),
                timestamp: delta.timestamp,
                utxo_id: id.clone(),
                kind: HistoryKind::Unfrozen,
                amount: utxo.amount,
            };
            let owner = utxo.owner_id.clone();
            inner.push_history(&owner, entry);
        }

        inner.total_supply = checked_supply(inner.total_supply, delta.supply_delta)?;
        for nullifier in &delta.nullifiers {
            inner.nullifiers.insert(nullifier.clone());
        }
        for record in &delta.commitments {
            inner
                .commitments
                .insert(record.commitment.clone(), record.clone());
        }
        inner.txs.insert(delta.tx_id.clone());

        debug!(
            tx_id = %delta.tx_id,
            spent = delta.spend.len(),
            created = delta.create.len(),
            supply_delta = delta.supply_delta,
            "Delta committed"
        );
        Ok(CommitOutcome::Committed)
    }
}
