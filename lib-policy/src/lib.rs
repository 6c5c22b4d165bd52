//! GENUSD Policy Engine
//!
//! Compliance state and yes/no/threshold answers for the transaction
//! validator: KYC registration, tiered spending limits, blacklist, and the
//! jurisdiction allowlist.
//!
//! # Key Rules
//!
//! 1. **Fail closed**: a missing or ambiguous KYC record rejects
//! 2. **Limits are policy data**: tier thresholds live in [`PolicyConfig`],
//!    never in validator code
//! 3. **Charge on commit only**: `record_spend` runs after a successful
//!    commit, never during validation

pub mod config;
pub mod engine;
pub mod errors;
pub mod kyc;

pub use config::PolicyConfig;
pub use engine::PolicyEngine;
pub use errors::{PolicyError, PolicyResult};
pub use kyc::{KycLevel, KycRecord, KycStatus};
