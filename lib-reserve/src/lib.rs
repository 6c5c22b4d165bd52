//! GENUSD Reserve Gate
//!
//! Full-reserve backing enforcement: circulating supply never exceeds the
//! most recent non-expired auditor attestation of fiat reserves.
//!
//! The gate never computes `verified_reserves` itself; that number is pushed
//! in by the external attestation collaborator. Supply moves only at commit
//! time via `apply_mint`/`apply_burn`.

pub mod errors;
pub mod gate;

pub use errors::{ReserveError, ReserveResult};
pub use gate::{
    Attestation, AttestationSource, ReserveConfig, ReserveGate, DEFAULT_FRESHNESS_WINDOW_SECS,
};
