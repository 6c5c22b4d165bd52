//! GENUSD Transaction Engine
//!
//! Accepts proposed MINT/TRANSFER/BURN transactions, checks them against the
//! UTXO set and the compliance/reserve policy, and atomically applies
//! accepted transactions to the ledger.
//!
//! # Key Rules
//!
//! 1. **Conservation**: a transfer's inputs and outputs sum equal, exactly
//! 2. **Full backing**: supply never exceeds the freshest attested reserves
//! 3. **No double-spend**: for two transactions spending the same output,
//!    exactly one commits; the other observes a deterministic conflict
//! 4. **No proof replay**: a nullifier, once recorded, rejects forever

pub mod auth;
pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod tx;
pub mod validate;

pub use auth::{AllowAllVerifier, Ed25519Verifier, SignatureVerifier};
pub use config::{EngineConfig, ASSET_CODE, DEFAULT_MAX_COMMIT_ATTEMPTS, MAX_UTXO_AMOUNT};
pub use engine::{LedgerEngine, SubmitReceipt};
pub use errors::{EngineError, EngineResult};
pub use events::{CollectingSink, EventSink, LedgerEvent, TracingSink};
pub use tx::{OutputSpec, Transaction, TxBody};
pub use validate::{validate, Accepted};
