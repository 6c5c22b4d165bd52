//! KYC Records
//!
//! Verification levels, record status, and tier-based spending limits.

use lib_types::{Amount, Timestamp};
use serde::{Deserialize, Serialize};

/// No limit sentinel for unlimited tiers.
pub const UNLIMITED: Amount = Amount::MAX;

/// KYC verification level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KycLevel {
    /// Not verified; may not transact.
    Level0,
    /// Basic verification ($1,000/day).
    Level1,
    /// Standard verification ($10,000/day).
    Level2,
    /// Enhanced/institutional verification (unlimited).
    Level3,
}

impl KycLevel {
    /// Daily spend cap for this tier, in cents.
    pub fn daily_limit(&self) -> Amount {
        match self {
            KycLevel::Level0 => 0,
            KycLevel::Level1 => 100_000,      // $1,000
            KycLevel::Level2 => 1_000_000,    // $10,000
            KycLevel::Level3 => UNLIMITED,
        }
    }

    /// 30-day spend cap for this tier, in cents.
    pub fn monthly_limit(&self) -> Amount {
        match self {
            KycLevel::Level0 => 0,
            KycLevel::Level1 => 500_000,      // $5,000
            KycLevel::Level2 => 5_000_000,    // $50,000
            KycLevel::Level3 => UNLIMITED,
        }
    }
}

/// Lifecycle status of a KYC record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KycStatus {
    Pending,
    Approved,
    Rejected,
    Suspended,
    Expired,
}

impl std::fmt::Display for KycStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            KycStatus::Pending => "pending",
            KycStatus::Approved => "approved",
            KycStatus::Rejected => "rejected",
            KycStatus::Suspended => "suspended",
            KycStatus::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// A principal's KYC registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KycRecord {
    pub level: KycLevel,
    pub status: KycStatus,
    /// Unix expiry; `None` means no expiration.
    pub expires_at: Option<Timestamp>,
    pub jurisdiction: String,
}

impl KycRecord {
    pub fn new(level: KycLevel, jurisdiction: impl Into<String>) -> Self {
        Self {
            level,
            status: KycStatus::Approved,
            expires_at: None,
            jurisdiction: jurisdiction.into(),
        }
    }

    pub fn with_expiry(mut self, expires_at: Timestamp) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        match self.expires_at {
            Some(expiry) => now > expiry,
            None => false,
        }
    }

    /// Whether the record permits transacting at `now`.
    pub fn is_valid(&self, now: Timestamp) -> bool {
        self.status == KycStatus::Approved && !self.is_expired(now) && self.level != KycLevel::Level0
    }
}
