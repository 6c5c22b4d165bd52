//! Reserve Gate Errors

use lib_types::{Amount, Timestamp};
use thiserror::Error;

/// Error during reserve checks or supply accounting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReserveError {
    #[error("No reserve attestation recorded")]
    NoAttestation,

    #[error("Reserve attestation expired: attested at {attested_at}, freshness window {window_secs}s")]
    AttestationExpired {
        attested_at: Timestamp,
        window_secs: u64,
    },

    #[error("Insufficient reserves: supply {supply} + mint {requested} > reserves {reserves}")]
    ReserveExceeded {
        supply: Amount,
        reserves: Amount,
        requested: Amount,
    },

    #[error("Supply overflow")]
    Overflow,

    #[error("Supply underflow: supply {supply}, burn {requested}")]
    Underflow { supply: Amount, requested: Amount },
}

/// Result type for reserve operations
pub type ReserveResult<T> = Result<T, ReserveError>;
