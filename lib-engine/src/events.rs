//! Engine Events
//!
//! Audit-relevant happenings, emitted after the state change they describe
//! has durably landed. The default sink logs through `tracing`; transports
//! that need a feed plug in their own [`EventSink`].

use lib_types::{Amount, OwnerId, TxId, UtxoId};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Something the engine did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    TransactionCommitted {
        tx_id: TxId,
        variant: String,
        supply_delta: i128,
        attempts: u32,
    },
    UtxoFrozen {
        utxo_id: UtxoId,
        admin: OwnerId,
        reason: String,
    },
    UtxoUnfrozen {
        utxo_id: UtxoId,
        admin: OwnerId,
    },
    ProofRecorded {
        nullifier: String,
        commitment: String,
    },
    AttestationIngested {
        verified_reserves: Amount,
        attested_at: u64,
    },
}

/// Event consumer.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &LedgerEvent);
}

/// Default sink: structured log lines only.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &LedgerEvent) {
        match event {
            LedgerEvent::TransactionCommitted {
                tx_id,
                variant,
                supply_delta,
                attempts,
            } => info!(
                tx_id = %tx_id,
                variant = %variant,
                supply_delta,
                attempts,
                "transaction committed"
            ),
            LedgerEvent::UtxoFrozen {
                utxo_id,
                admin,
                reason,
            } => info!(utxo_id = %utxo_id, admin = %admin, reason = %reason, "utxo frozen"),
            LedgerEvent::UtxoUnfrozen { utxo_id, admin } => {
                info!(utxo_id = %utxo_id, admin = %admin, "utxo unfrozen")
            }
            LedgerEvent::ProofRecorded {
                nullifier,
                commitment,
            } => info!(nullifier = %nullifier, commitment = %commitment, "proof recorded"),
            LedgerEvent::AttestationIngested {
                verified_reserves,
                attested_at,
            } => info!(verified_reserves, attested_at, "reserve attestation ingested"),
        }
    }
}

/// Collects events in memory, for tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: parking_lot::Mutex<Vec<LedgerEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events.lock())
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: &LedgerEvent) {
        self.events.lock().push(event.clone());
    }
}
