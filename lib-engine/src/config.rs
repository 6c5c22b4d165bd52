//! Engine Configuration

use std::collections::HashSet;

use lib_types::{Amount, OwnerId};
use serde::{Deserialize, Serialize};

/// Supported asset code; this is a single-asset system.
pub const ASSET_CODE: &str = "GENUSD";

/// Per-output amount cap, in cents.
pub const MAX_UTXO_AMOUNT: Amount = 999_999_999_999_999;

/// Default bound on validate-and-commit attempts under conflict.
pub const DEFAULT_MAX_COMMIT_ATTEMPTS: u32 = 3;

/// Default acceptance window for signed admin actions, in seconds.
pub const DEFAULT_ADMIN_AUTH_WINDOW_SECS: u64 = 300;

/// Static engine parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub asset_code: String,
    /// Per-output amount cap, enforced at schema time.
    pub max_utxo_amount: Amount,
    /// Conflict retry bound for `submit`.
    pub max_commit_attempts: u32,
    /// Admin signatures older than this (relative to their signed `issued_at`)
    /// are rejected, so a captured freeze/unfreeze cannot be replayed later.
    pub admin_auth_window_secs: u64,
    /// Principal authorized to mint and to burn by issuer signature.
    pub issuer: OwnerId,
    /// Principals allowed to freeze/unfreeze outputs.
    pub admins: HashSet<OwnerId>,
}

impl EngineConfig {
    pub fn new(issuer: OwnerId) -> Self {
        Self {
            asset_code: ASSET_CODE.to_string(),
            max_utxo_amount: MAX_UTXO_AMOUNT,
            max_commit_attempts: DEFAULT_MAX_COMMIT_ATTEMPTS,
            admin_auth_window_secs: DEFAULT_ADMIN_AUTH_WINDOW_SECS,
            issuer: issuer.clone(),
            admins: [issuer].into_iter().collect(),
        }
    }

    pub fn with_admin(mut self, admin: OwnerId) -> Self {
        self.admins.insert(admin);
        self
    }

    pub fn is_admin(&self, principal: &OwnerId) -> bool {
        self.admins.contains(principal)
    }

    /// Issuer `treasury`, for unit tests.
    pub fn for_testing() -> Self {
        Self::new(OwnerId::new("treasury"))
    }
}
