//! Canonical primitives for the GENUSD ledger engine.
//!
//! Every crate in the workspace builds on these types. Identifiers are opaque
//! strings (owner identities come from an external enrollment system and look
//! like x509 distinguished names); amounts are integer cents.

pub mod capability;
pub mod clock;
pub mod primitives;

pub use capability::CapabilityError;
pub use clock::{Clock, FixedClock, SystemClock};
pub use primitives::{Amount, IdError, OwnerId, Timestamp, TxId, UtxoId, Version};
