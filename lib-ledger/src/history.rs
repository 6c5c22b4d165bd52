//! Append-only Per-owner History
//!
//! One immutable entry per mutation a transaction caused for an owner's
//! outputs, tagged with the causing `tx_id`. History never shrinks and never
//! reorders.

use lib_types::{Amount, Timestamp, TxId, UtxoId};
use serde::{Deserialize, Serialize};

/// What happened to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    /// Output created (mint or transfer output).
    Created,
    /// Output consumed as a transaction input.
    Spent,
    /// Output frozen by admin action.
    Frozen,
    /// Output unfrozen by admin action.
    Unfrozen,
}

/// Immutable audit record for one mutated output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub tx_id: TxId,
    pub timestamp: Timestamp,
    pub utxo_id: UtxoId,
    pub kind: HistoryKind,
    /// Amount of the affected output.
    pub amount: Amount,
}

impl HistoryEntry {
    /// Signed balance effect for the owner: positive for created outputs,
    /// negative for spent ones, zero for freeze transitions.
    pub fn balance_delta(&self) -> i128 {
        match self.kind {
            HistoryKind::Created => self.amount as i128,
            HistoryKind::Spent => -(self.amount as i128),
            HistoryKind::Frozen | HistoryKind::Unfrozen => 0,
        }
    }
}
