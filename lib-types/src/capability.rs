//! Capability call failures.
//!
//! External verification capabilities (signatures, proof math, attestation
//! feeds) are synchronous, time-bounded calls. A failed or timed-out call is
//! a transient validation failure, never an indefinite block.

use thiserror::Error;

/// Failure to reach or complete an external capability call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("Capability {0} timed out")]
    Timeout(String),

    #[error("Capability {capability} unavailable: {reason}")]
    Unavailable { capability: String, reason: String },
}

impl CapabilityError {
    pub fn unavailable(capability: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            capability: capability.into(),
            reason: reason.into(),
        }
    }
}
