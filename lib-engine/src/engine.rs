//! Engine Facade
//!
//! Owns the store, the policy engine, and the reserve gate, and wires the
//! validator to the commit path. This is the surface a transport layer
//! (REST, CLI) consumes.
//!
//! # Key Rules
//!
//! 1. **Counter checks are atomic with commit**: the reserve gate (mints) and
//!    spend counters (transfers) are re-checked and moved under their write
//!    lock around the store commit, so racing submissions serialize on the
//!    counter they move
//! 2. **Conflicts retry bounded**: `submit` re-validates against the fresh
//!    snapshot up to `max_commit_attempts` times
//! 3. **No rejection mutates state**

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use lib_ledger::{
    CommitOutcome, HistoryEntry, LedgerDelta, LedgerStore, ReadSetEntry, Utxo, UtxoStatus,
};
use lib_policy::{KycRecord, PolicyEngine};
use lib_proofs::{validate_structure, CommitmentRecord, ZkProof, ZkVerifier};
use lib_reserve::{Attestation, AttestationSource, ReserveGate};
use lib_types::{Amount, Clock, OwnerId, Timestamp, TxId, UtxoId};

use crate::auth::SignatureVerifier;
use crate::config::EngineConfig;
use crate::errors::{EngineError, EngineResult};
use crate::events::{EventSink, LedgerEvent, TracingSink};
use crate::tx::Transaction;
use crate::validate::{validate, Accepted};

/// Outcome of a committed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub tx_id: TxId,
    /// Identifiers of the outputs this transaction created.
    pub created: Vec<UtxoId>,
    /// Validate-and-commit attempts it took (1 unless conflicts occurred).
    pub attempts: u32,
}

/// The UTXO ledger validation engine.
pub struct LedgerEngine {
    store: Arc<dyn LedgerStore>,
    config: EngineConfig,
    policy: RwLock<PolicyEngine>,
    reserve: RwLock<ReserveGate>,
    signatures: Arc<dyn SignatureVerifier>,
    zk: Arc<dyn ZkVerifier>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
    /// Disambiguates admin-action transaction ids within one second.
    admin_seq: AtomicU64,
}

impl LedgerEngine {
    /// Wire up an engine over an existing store. The reserve gate's supply
    /// counter is rehydrated from the persisted ledger.
    pub fn new(
        store: Arc<dyn LedgerStore>,
        config: EngineConfig,
        policy: PolicyEngine,
        reserve: ReserveGate,
        signatures: Arc<dyn SignatureVerifier>,
        zk: Arc<dyn ZkVerifier>,
        clock: Arc<dyn Clock>,
    ) -> EngineResult<Self> {
        let supply = store.total_supply()?;
        Ok(Self {
            store,
            config,
            policy: RwLock::new(policy),
            reserve: RwLock::new(reserve.with_total_supply(supply)),
            signatures,
            zk,
            clock,
            events: Arc::new(TracingSink),
            admin_seq: AtomicU64::new(0),
        })
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Validate and commit a transaction, retrying on commit conflicts up to
    /// the configured bound.
    pub fn submit(&self, tx: &Transaction) -> EngineResult<SubmitReceipt> {
        let max_attempts = self.config.max_commit_attempts.max(1);
        for attempt in 1..=max_attempts {
            let now = self.clock.now();
            let accepted = {
                let policy = self.policy.read();
                let reserve = self.reserve.read();
                validate(
                    self.store.as_ref(),
                    &policy,
                    &reserve,
                    self.signatures.as_ref(),
                    &self.config,
                    tx,
                    now,
                )?
            };

            match self.commit_guarded(&accepted, now)? {
                CommitOutcome::Committed => {
                    let created: Vec<UtxoId> = accepted
                        .delta
                        .create
                        .iter()
                        .map(|u| u.utxo_id.clone())
                        .collect();
                    self.events.emit(&LedgerEvent::TransactionCommitted {
                        tx_id: tx.tx_id.clone(),
                        variant: tx.variant_name().to_string(),
                        supply_delta: accepted.delta.supply_delta,
                        attempts: attempt,
                    });
                    return Ok(SubmitReceipt {
                        tx_id: tx.tx_id.clone(),
                        created,
                        attempts: attempt,
                    });
                }
                CommitOutcome::Conflict(info) => {
                    debug!(
                        tx_id = %tx.tx_id,
                        utxo_id = %info.utxo_id,
                        attempt,
                        "conflict, re-validating against fresh snapshot"
                    );
                }
            }
        }
        Err(EngineError::Conflict {
            attempts: max_attempts,
        })
    }

    /// Commit the delta with the invariant counter it moves held exclusively.
    ///
    /// The validate-time checks ran against a read-locked snapshot that was
    /// released before commit, so two submissions with disjoint read sets
    /// could each pass individually and jointly overshoot a counter. Mints
    /// re-check the reserve gate and transfers re-check spend limits under
    /// the respective write lock around the store commit; the second of two
    /// racing submissions sees the first one's charge.
    fn commit_guarded(&self, accepted: &Accepted, now: Timestamp) -> EngineResult<CommitOutcome> {
        let delta = &accepted.delta;
        if delta.supply_delta > 0 {
            let magnitude = supply_magnitude(delta.supply_delta)?;
            let mut reserve = self.reserve.write();
            reserve.can_mint(magnitude, now)?;
            let outcome = self.store.commit(delta, &accepted.read_set)?;
            if outcome.is_committed() {
                reserve.apply_mint(magnitude)?;
            }
            Ok(outcome)
        } else if !accepted.spend_by_owner.is_empty() {
            let mut policy = self.policy.write();
            for (owner, amount) in &accepted.spend_by_owner {
                policy.check_spend(owner, *amount, now)?;
            }
            let outcome = self.store.commit(delta, &accepted.read_set)?;
            if outcome.is_committed() {
                for (owner, amount) in &accepted.spend_by_owner {
                    policy.record_spend(owner, *amount, now);
                }
            }
            Ok(outcome)
        } else {
            let outcome = self.store.commit(delta, &accepted.read_set)?;
            if outcome.is_committed() && delta.supply_delta < 0 {
                let magnitude = supply_magnitude(delta.supply_delta)?;
                self.reserve.write().apply_burn(magnitude)?;
            }
            Ok(outcome)
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Sum of the owner's active UTXO amounts.
    pub fn get_balance(&self, owner: &OwnerId) -> EngineResult<Amount> {
        Ok(self.store.balance(owner)?)
    }

    pub fn get_utxo(&self, id: &UtxoId) -> EngineResult<Option<Utxo>> {
        Ok(self.store.get_utxo(id)?.map(|(utxo, _)| utxo))
    }

    /// The owner's active outputs, for wallet display.
    pub fn owner_utxos(&self, owner: &OwnerId) -> EngineResult<Vec<Utxo>> {
        let mut utxos = self.store.owner_utxos(owner)?;
        utxos.retain(Utxo::is_active);
        Ok(utxos)
    }

    pub fn get_history(&self, owner: &OwnerId) -> EngineResult<Vec<HistoryEntry>> {
        Ok(self.store.history(owner)?)
    }

    pub fn get_total_supply(&self) -> EngineResult<Amount> {
        Ok(self.store.total_supply()?)
    }

    pub fn verified_reserves(&self) -> Amount {
        self.reserve.read().verified_reserves()
    }

    // =========================================================================
    // Admin surface
    // =========================================================================

    /// Freeze an active UTXO. Requires an admin signature over the action
    /// payload, which folds in `issued_at` so a captured signature cannot be
    /// replayed outside the acceptance window.
    pub fn freeze(
        &self,
        admin: &OwnerId,
        signature: &[u8],
        issued_at: Timestamp,
        utxo_id: &UtxoId,
        reason: &str,
    ) -> EngineResult<()> {
        let payload = format!("FREEZE:{utxo_id}:{reason}:{issued_at}");
        self.check_admin(admin, signature, issued_at, payload.as_bytes())?;

        self.admin_commit(utxo_id, "FREEZE", |utxo, delta| match utxo.status {
            UtxoStatus::Spent => Err(EngineError::AlreadySpent(utxo.utxo_id.clone())),
            UtxoStatus::Frozen => Err(EngineError::FrozenUtxo(utxo.utxo_id.clone())),
            UtxoStatus::Active => {
                delta.freeze.push((utxo.utxo_id.clone(), reason.to_string()));
                Ok(())
            }
        })?;

        self.events.emit(&LedgerEvent::UtxoFrozen {
            utxo_id: utxo_id.clone(),
            admin: admin.clone(),
            reason: reason.to_string(),
        });
        Ok(())
    }

    /// Return a frozen UTXO to active.
    pub fn unfreeze(
        &self,
        admin: &OwnerId,
        signature: &[u8],
        issued_at: Timestamp,
        utxo_id: &UtxoId,
    ) -> EngineResult<()> {
        let payload = format!("UNFREEZE:{utxo_id}:{issued_at}");
        self.check_admin(admin, signature, issued_at, payload.as_bytes())?;

        self.admin_commit(utxo_id, "UNFREEZE", |utxo, delta| match utxo.status {
            UtxoStatus::Spent => Err(EngineError::AlreadySpent(utxo.utxo_id.clone())),
            UtxoStatus::Active => Err(EngineError::NotFrozen(utxo.utxo_id.clone())),
            UtxoStatus::Frozen => {
                delta.unfreeze.push(utxo.utxo_id.clone());
                Ok(())
            }
        })?;

        self.events.emit(&LedgerEvent::UtxoUnfrozen {
            utxo_id: utxo_id.clone(),
            admin: admin.clone(),
        });
        Ok(())
    }

    fn check_admin(
        &self,
        admin: &OwnerId,
        signature: &[u8],
        issued_at: Timestamp,
        payload: &[u8],
    ) -> EngineResult<()> {
        if !self.config.is_admin(admin) {
            return Err(EngineError::Unauthorized(format!(
                "{admin} is not an administrator"
            )));
        }
        let now = self.clock.now();
        if issued_at > now || now - issued_at > self.config.admin_auth_window_secs {
            return Err(EngineError::Unauthorized(format!(
                "admin authorization from {admin} issued at {issued_at} is outside the acceptance window"
            )));
        }
        if !self.signatures.verify(payload, signature, admin)? {
            return Err(EngineError::Unauthorized(format!(
                "invalid admin signature from {admin}"
            )));
        }
        Ok(())
    }

    /// Read-check-commit loop for single-UTXO admin actions.
    fn admin_commit(
        &self,
        utxo_id: &UtxoId,
        action: &str,
        build: impl Fn(&Utxo, &mut LedgerDelta) -> EngineResult<()>,
    ) -> EngineResult<()> {
        let max_attempts = self.config.max_commit_attempts.max(1);
        for _ in 1..=max_attempts {
            let now = self.clock.now();
            let (utxo, version) = self
                .store
                .get_utxo(utxo_id)?
                .ok_or_else(|| EngineError::NotFound(utxo_id.clone()))?;

            let seq = self.admin_seq.fetch_add(1, Ordering::SeqCst);
            let tx_id = TxId::new(format!("{action}_{utxo_id}_{now}_{seq}"));
            let mut delta = LedgerDelta::new(tx_id, now);
            build(&utxo, &mut delta)?;

            let read_set = [ReadSetEntry::new(utxo_id.clone(), version)];
            match self.store.commit(&delta, &read_set)? {
                CommitOutcome::Committed => return Ok(()),
                CommitOutcome::Conflict(_) => continue,
            }
        }
        Err(EngineError::Conflict {
            attempts: max_attempts,
        })
    }

    // =========================================================================
    // Proofs
    // =========================================================================

    /// Verify a zero-knowledge proof and consume its nullifier.
    ///
    /// Recording and acceptance are one atomic commit: two racing
    /// submissions of the same proof can both pass verification, but only
    /// one records the nullifier; the loser surfaces `NullifierReused`.
    pub fn submit_proof(&self, proof: &ZkProof) -> EngineResult<()> {
        validate_structure(proof)?;
        if self.store.nullifier_used(&proof.nullifier)? {
            return Err(EngineError::NullifierReused(proof.nullifier.clone()));
        }
        if self.store.commitment(&proof.commitment)?.is_some() {
            return Err(EngineError::CommitmentExists(proof.commitment.clone()));
        }
        if !self.zk.verify(proof)? {
            return Err(EngineError::InvalidProof);
        }

        let tx_id = TxId::new(format!("PROOF_{}", proof.nullifier));
        let mut record = CommitmentRecord::from_proof(proof, tx_id.clone());
        record.used = true;

        let mut delta = LedgerDelta::new(tx_id, self.clock.now());
        delta.nullifiers.push(proof.nullifier.clone());
        delta.commitments.push(record);
        // Empty read set: uniqueness races surface as fatal duplicates from
        // the store, not conflicts.
        self.store.commit(&delta, &[])?;

        self.events.emit(&LedgerEvent::ProofRecorded {
            nullifier: proof.nullifier.clone(),
            commitment: proof.commitment.clone(),
        });
        Ok(())
    }

    // =========================================================================
    // Reserve and policy administration
    // =========================================================================

    /// Ingest an auditor attestation of fiat reserves.
    pub fn attest_reserve(&self, attestation: Attestation) {
        self.events.emit(&LedgerEvent::AttestationIngested {
            verified_reserves: attestation.verified_reserves,
            attested_at: attestation.attested_at,
        });
        self.reserve.write().ingest(attestation);
    }

    /// Pull the freshest attestation from a source, if it has one.
    pub fn pull_attestation(&self, source: &dyn AttestationSource) -> bool {
        match source.latest() {
            Some(attestation) => {
                self.attest_reserve(attestation);
                true
            }
            None => false,
        }
    }

    pub fn register_kyc(&self, owner: OwnerId, record: KycRecord) {
        self.policy.write().register_kyc(owner, record);
    }

    pub fn set_blacklisted(&self, owner: OwnerId, blacklisted: bool) {
        self.policy.write().set_blacklisted(owner, blacklisted);
    }
}

fn supply_magnitude(supply_delta: i128) -> EngineResult<Amount> {
    u64::try_from(supply_delta.unsigned_abs())
        .map_err(|_| EngineError::Storage("supply delta out of range".to_string()))
}
