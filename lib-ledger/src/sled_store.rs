//! Persistent sled Ledger Store
//!
//! Durable implementation of [`LedgerStore`] on sled 0.34. All records are
//! JSON values under prefixed string keys:
//!
//! - `UTXO_{tx_id}:{index}` - versioned UTXO record
//! - `TOTAL_SUPPLY` - circulating supply counter
//! - `NULLIFIER_{nullifier}` - one-time token marker
//! - `COMMITMENT_{commitment}` - proof commitment record
//! - `TX_{tx_id}` - committed transaction marker
//! - `HISTORY_{owner}_{seq:016}` - per-owner history entry
//! - `HSEQ_{owner}` - next history sequence number for the owner
//!
//! Commits are serialized under a mutex so the read-set check and the batch
//! write form one critical section; the batch itself is applied atomically
//! by sled.

use std::path::Path;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use lib_proofs::CommitmentRecord;
use lib_types::{Amount, OwnerId, TxId, UtxoId, Version};

use crate::delta::{LedgerDelta, ReadSetEntry};
use crate::errors::{LedgerError, LedgerResult};
use crate::history::{HistoryEntry, HistoryKind};
use crate::memory::checked_supply;
use crate::store::{CommitOutcome, ConflictInfo, LedgerStore};
use crate::types::{Utxo, UtxoStatus};

const KEY_TOTAL_SUPPLY: &str = "TOTAL_SUPPLY";
const PREFIX_UTXO: &str = "UTXO_";
const PREFIX_NULLIFIER: &str = "NULLIFIER_";
const PREFIX_COMMITMENT: &str = "COMMITMENT_";
const PREFIX_TX: &str = "TX_";
const PREFIX_HISTORY: &str = "HISTORY_";
const PREFIX_HSEQ: &str = "HSEQ_";

/// Stored form of a UTXO with its concurrency version.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VersionedUtxo {
    utxo: Utxo,
    version: Version,
}

/// Durable store for deployments that must survive restarts.
pub struct SledLedgerStore {
    db: sled::Db,
    /// Serializes commits; reads go straight to sled.
    commit_lock: Mutex<()>,
}

impl SledLedgerStore {
    /// Open or create the ledger database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> LedgerResult<Self> {
        let db = sled::Config::default()
            .path(path.as_ref())
            .cache_capacity(64 * 1024 * 1024) // 64 MB
            .mode(sled::Mode::HighThroughput)
            .open()?;
        Ok(Self {
            db,
            commit_lock: Mutex::new(()),
        })
    }

    /// Temporary database, removed on drop.
    pub fn temporary() -> LedgerResult<Self> {
        let db = sled::Config::default().temporary(true).open()?;
        Ok(Self {
            db,
            commit_lock: Mutex::new(()),
        })
    }

    fn utxo_key(id: &UtxoId) -> String {
        format!("{PREFIX_UTXO}{id}")
    }

    fn get_versioned(&self, id: &UtxoId) -> LedgerResult<Option<VersionedUtxo>> {
        match self.db.get(Self::utxo_key(id).as_bytes())? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    fn history_seq(&self, owner: &OwnerId) -> LedgerResult<u64> {
        match self.db.get(format!("{PREFIX_HSEQ}{owner}").as_bytes())? {
            Some(raw) => Ok(serde_json::from_slice(&raw)?),
            None => Ok(0),
        }
    }
}

impl LedgerStore for SledLedgerStore {
    fn get_utxo(&self, id: &UtxoId) -> LedgerResult<Option<(Utxo, Version)>> {
        Ok(self.get_versioned(id)?.map(|v| (v.utxo, v.version)))
    }

    fn total_supply(&self) -> LedgerResult<Amount> {
        match self.db.get(KEY_TOTAL_SUPPLY.as_bytes())? {
            Some(raw) => Ok(serde_json::from_slice(&raw)?),
            None => Ok(0),
        }
    }

    fn nullifier_used(&self, nullifier: &str) -> LedgerResult<bool> {
        Ok(self
            .db
            .contains_key(format!("{PREFIX_NULLIFIER}{nullifier}").as_bytes())?)
    }

    fn commitment(&self, commitment: &str) -> LedgerResult<Option<CommitmentRecord>> {
        match self
            .db
            .get(format!("{PREFIX_COMMITMENT}{commitment}").as_bytes())?
        {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    fn tx_exists(&self, tx_id: &TxId) -> LedgerResult<bool> {
        Ok(self
            .db
            .contains_key(format!("{PREFIX_TX}{tx_id}").as_bytes())?)
    }

    fn owner_utxos(&self, owner: &OwnerId) -> LedgerResult<Vec<Utxo>> {
        let mut found = Vec::new();
        for item in self.db.scan_prefix(PREFIX_UTXO.as_bytes()) {
            let (_, raw) = item?;
            let record: VersionedUtxo = serde_json::from_slice(&raw)?;
            if &record.utxo.owner_id == owner {
                found.push(record.utxo);
            }
        }
        Ok(found)
    }

    fn history(&self, owner: &OwnerId) -> LedgerResult<Vec<HistoryEntry>> {
        // Sequence numbers are zero-padded, so lexicographic scan order is
        // append order.
        let mut entries = Vec::new();
        let prefix = format!("{PREFIX_HISTORY}{owner}_");
        for item in self.db.scan_prefix(prefix.as_bytes()) {
            let (key, raw) = item?;
            // Owner ids may contain underscores; a real entry key ends in
            // exactly the 16-digit sequence number.
            let suffix = &key[prefix.len()..];
            if suffix.len() != 16 || !suffix.iter().all(u8::is_ascii_digit) {
                continue;
            }
            entries.push(serde_json::from_slice(&raw)?);
        }
        Ok(entries)
    }

    fn commit(
        &self,
        delta: &LedgerDelta,
        read_set: &[ReadSetEntry],
    ) -> LedgerResult<CommitOutcome> {
        let _guard = self.commit_lock.lock();

        for entry in read_set {
            let found = self.get_versioned(&entry.utxo_id)?.map(|v| v.version);
            if found != Some(entry.version) {
                debug!(
                    tx_id = %delta.tx_id,
                    utxo_id = %entry.utxo_id,
                    expected = entry.version,
                    "Commit conflict, read-set version moved"
                );
                return Ok(CommitOutcome::Conflict(ConflictInfo {
                    utxo_id: entry.utxo_id.clone(),
                    expected: entry.version,
                    found,
                }));
            }
        }

        if self.tx_exists(&delta.tx_id)? {
            return Err(LedgerError::DuplicateTx(delta.tx_id.clone()));
        }
        for utxo in &delta.create {
            if self.get_versioned(&utxo.utxo_id)?.is_some() {
                return Err(LedgerError::DuplicateUtxo(utxo.utxo_id.clone()));
            }
        }
        for nullifier in &delta.nullifiers {
            if self.nullifier_used(nullifier)? {
                return Err(LedgerError::NullifierExists(nullifier.clone()));
            }
        }
        for record in &delta.commitments {
            if self.commitment(&record.commitment)?.is_some() {
                return Err(LedgerError::CommitmentExists(record.commitment.clone()));
            }
        }
        let next_supply = checked_supply(self.total_supply()?, delta.supply_delta)?;

        let mut batch = sled::Batch::default();
        let mut seqs: std::collections::HashMap<OwnerId, u64> = std::collections::HashMap::new();

        let push_history = |batch: &mut sled::Batch,
                                seqs: &mut std::collections::HashMap<OwnerId, u64>,
                                owner: &OwnerId,
                                entry: &HistoryEntry|
         -> LedgerResult<()> {
            let seq = match seqs.get(owner) {
                Some(s) => *s,
                None => self.history_seq(owner)?,
            };
            batch.insert(
                format!("{PREFIX_HISTORY}{owner}_{seq:016}").into_bytes(),
                serde_json::to_vec(entry)?,
            );
            batch.insert(
                format!("{PREFIX_HSEQ}{owner}").into_bytes(),
                serde_json::to_vec(&(seq + 1))?,
            );
            seqs.insert(owner.clone(), seq + 1);
            Ok(())
        };

        for id in &delta.spend {
            let mut record = self
                .get_versioned(id)?
                .ok_or_else(|| LedgerError::Storage(format!("missing spend target {id}")))?;
            record.utxo.status = UtxoStatus::Spent;
            record.version += 1;
            let owner = record.utxo.owner_id.clone();
            let amount = record.utxo.amount;
            batch.insert(Self::utxo_key(id).into_bytes(), serde_json::to_vec(&record)?);
            let entry = HistoryEntry {
                tx_id: delta.tx_id.clone(),
                timestamp: delta.timestamp,
                utxo_id: id.clone(),
                kind: HistoryKind::Spent,
                amount,
            };
            push_history(&mut batch, &mut seqs, &owner, &entry)?;
        }

        for utxo in &delta.create {
            let record = VersionedUtxo {
                utxo: utxo.clone(),
                version: 1,
            };
            batch.insert(
                Self::utxo_key(&utxo.utxo_id).into_bytes(),
                serde_json::to_vec(&record)?,
            );
            let entry = HistoryEntry {
                tx_id: delta.tx_id.clone(),
                timestamp: delta.timestamp,
                utxo_id: utxo.utxo_id.clone(),
                kind: HistoryKind::Created,
                amount: utxo.amount,
            };
            push_history(&mut batch, &mut seqs, &utxo.owner_id, &entry)?;
        }

        for (id, reason) in &delta.freeze {
            let mut record = self
                .get_versioned(id)?
                .ok_or_else(|| LedgerError::Storage(format!("missing freeze target {id}")))?;
            record.utxo.status = UtxoStatus::Frozen;
            record.utxo.metadata.freeze_reason = Some(reason.clone());
            record.version += 1;
            let owner = record.utxo.owner_id.clone();
            let amount = record.utxo.amount;
            batch.insert(Self::utxo_key(id).into_bytes(), serde_json::to_vec(&record)?);
            let entry = HistoryEntry {
                tx_id: delta.tx_id.clone(),
                timestamp: delta.timestamp,
                utxo_id: id.clone(),
                kind: HistoryKind::Frozen,
                amount,
            };
            push_history(&mut batch, &mut seqs, &owner, &entry)?;
        }

        for id in &delta.unfreeze {
            let mut record = self
                .get_versioned(id)?
                .ok_or_else(|| LedgerError::Storage(format!("missing unfreeze target {id}")))?;
            record.utxo.status = UtxoStatus::Active;
            record.utxo.metadata.freeze_reason = None;
            record.version += 1;
            let owner = record.utxo.owner_id.clone();
            let amount = record.utxo.amount;
            batch.insert(Self::utxo_key(id).into_bytes(), serde_json::to_vec(&record)?);
            let entry = HistoryEntry {
                tx_id: delta.tx_id.clone(),
                timestamp: delta.timestamp,
                utxo_id: id.clone(),
                kind: HistoryKind::Unfrozen,
                amount,
            };
            push_history(&mut batch, &mut seqs, &owner, &entry)?;
        }

        batch.insert(
            KEY_TOTAL_SUPPLY.as_bytes().to_vec(),
            serde_json::to_vec(&next_supply)?,
        );
        for nullifier in &delta.nullifiers {
            batch.insert(
                format!("{PREFIX_NULLIFIER}{nullifier}").into_bytes(),
                serde_json::to_vec(&delta.tx_id)?,
            );
        }
        for record in &delta.commitments {
            batch.insert(
                format!("{PREFIX_COMMITMENT}{}", record.commitment).into_bytes(),
                serde_json::to_vec(record)?,
            );
        }
        batch.insert(
            format!("{PREFIX_TX}{}", delta.tx_id).into_bytes(),
            serde_json::to_vec(&delta.timestamp)?,
        );

        self.db.apply_batch(batch)?;
        self.db.flush()?;

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

#[cfg(test)]
mod tests {
    use super::*;
    use lib_policy::KycLevel;
    use lib_types::TxId;

    use crate::types::UtxoMetadata;

    fn utxo(tx: &str, index: u32, owner: &str, amount: Amount) -> Utxo {
        Utxo {
            utxo_id: UtxoId::new(TxId::new(tx), index),
            owner_id: OwnerId::new(owner),
            asset_code: "GENUSD".to_string(),
            amount,
            status: UtxoStatus::Active,
            kyc_tag: KycLevel::Level2,
            created_at: 1_764_000_000,
            metadata: UtxoMetadata::new("US", "POLICY_V1.0"),
        }
    }

    fn mint_delta(tx: &str, owner: &str, amount: Amount) -> LedgerDelta {
        let mut delta = LedgerDelta::new(TxId::new(tx), 1_764_000_000);
        delta.create.push(utxo(tx, 0, owner, amount));
        delta.supply_delta = amount as i128;
        delta
    }

    #[test]
    fn test_commit_and_read_back() {
        let store = SledLedgerStore::temporary().unwrap();
        store.commit(&mint_delta("MINT1", "alice", 5_000), &[]).unwrap();

        assert_eq!(store.total_supply().unwrap(), 5_000);
        assert!(store.tx_exists(&TxId::new("MINT1")).unwrap());
        let (stored, version) = store
            .get_utxo(&UtxoId::new(TxId::new("MINT1"), 0))
            .unwrap()
            .unwrap();
        assert_eq!(stored.amount, 5_000);
        assert_eq!(version, 1);
        assert_eq!(store.balance(&OwnerId::new("alice")).unwrap(), 5_000);
    }

    #[test]
    fn test_conflict_and_nullifier_match_memory_semantics() {
        let store = SledLedgerStore::temporary().unwrap();
        store.commit(&mint_delta("MINT1", "alice", 5_000), &[]).unwrap();
        let id = UtxoId::new(TxId::new("MINT1"), 0);

        let mut spend = LedgerDelta::new(TxId::new("BURN1"), 2);
        spend.spend.push(id.clone());
        spend.supply_delta = -5_000;
        spend.nullifiers.push("N1".to_string());

        // Stale version conflicts without applying anything
        let outcome = store
            .commit(&spend, &[ReadSetEntry::new(id.clone(), 9)])
            .unwrap();
        assert!(matches!(outcome, CommitOutcome::Conflict(_)));
        assert_eq!(store.total_supply().unwrap(), 5_000);

        // Correct version commits
        let outcome = store
            .commit(&spend, &[ReadSetEntry::new(id.clone(), 1)])
            .unwrap();
        assert!(outcome.is_committed());
        assert!(store.nullifier_used("N1").unwrap());

        // Replaying the nullifier in a fresh tx is fatal
        let mut replay = LedgerDelta::new(TxId::new("BURN2"), 3);
        replay.nullifiers.push("N1".to_string());
        assert!(matches!(
            store.commit(&replay, &[]),
            Err(LedgerError::NullifierExists(_))
        ));
    }

    #[test]
    fn test_history_owners_with_underscores_do_not_collide() {
        let store = SledLedgerStore::temporary().unwrap();
        store.commit(&mint_delta("MINT1", "org_a", 100), &[]).unwrap();
        store
            .commit(&mint_delta("MINT2", "org_a_audit", 200), &[])
            .unwrap();

        let history = store.history(&OwnerId::new("org_a")).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].amount, 100);
    }

    #[test]
    fn test_history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = SledLedgerStore::open(dir.path()).unwrap();
            store.commit(&mint_delta("MINT1", "alice", 5_000), &[]).unwrap();
            store.commit(&mint_delta("MINT2", "alice", 2_000), &[]).unwrap();
        }
        let store = SledLedgerStore::open(dir.path()).unwrap();
        let history = store.history(&OwnerId::new("alice")).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].tx_id, TxId::new("MINT1"));
        assert_eq!(history[1].tx_id, TxId::new("MINT2"));
        assert_eq!(store.total_supply().unwrap(), 7_000);
    }
}
