//! GENUSD Ledger Store
//!
//! Durable, versioned mapping from identifier to record: UTXOs, the supply
//! counter, the nullifier set, the commitment log, and per-owner history.
//!
//! # Key Rules
//!
//! 1. **Every mutation bumps a per-key version**: the optimistic-concurrency
//!    commit check compares versions, never whole records
//! 2. **Commit is all-or-nothing**: a delta lands completely or not at all
//! 3. **Records are never deleted**: spent UTXOs and history entries stay
//!    queryable forever

pub mod delta;
pub mod errors;
pub mod history;
pub mod memory;
pub mod sled_store;
pub mod store;
pub mod types;

pub use delta::{LedgerDelta, ReadSetEntry};
pub use errors::{LedgerError, LedgerResult};
pub use history::{HistoryEntry, HistoryKind};
pub use memory::MemoryLedgerStore;
pub use sled_store::SledLedgerStore;
pub use store::{CommitOutcome, ConflictInfo, LedgerStore};
pub use types::{Utxo, UtxoMetadata, UtxoStatus};
