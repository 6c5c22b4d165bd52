//! Policy Engine
//!
//! Holds the KYC registry, blacklist, and per-owner spend counters, and
//! answers the validator's compliance questions.
//!
//! Spend counters are bucketed by UTC day (`unix / 86_400`) and by 30-day
//! window; both roll over automatically as the injected clock advances.

use std::collections::{HashMap, HashSet};

use lib_types::{Amount, OwnerId, Timestamp};
use tracing::info;

use crate::config::PolicyConfig;
use crate::errors::{PolicyError, PolicyResult};
use crate::kyc::{KycLevel, KycRecord, UNLIMITED};

const SECS_PER_DAY: u64 = 86_400;
const DAYS_PER_WINDOW: u64 = 30;

/// Compliance state and rule enforcement.
#[derive(Debug)]
pub struct PolicyEngine {
    config: PolicyConfig,
    kyc_registry: HashMap<OwnerId, KycRecord>,
    blacklist: HashSet<OwnerId>,
    /// (owner, day bucket) -> amount spent
    daily_spent: HashMap<(OwnerId, u64), Amount>,
    /// (owner, 30-day bucket) -> amount spent
    monthly_spent: HashMap<(OwnerId, u64), Amount>,
}

impl PolicyEngine {
    pub fn new(config: PolicyConfig) -> Self {
        Self {
            config,
            kyc_registry: HashMap::new(),
            blacklist: HashSet::new(),
            daily_spent: HashMap::new(),
            monthly_spent: HashMap::new(),
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Whether `policy_ref` names the active policy.
    pub fn policy_known(&self, policy_ref: &str) -> bool {
        policy_ref == self.config.policy_version
    }

    // =========================================================================
    // Registry administration
    // =========================================================================

    pub fn register_kyc(&mut self, owner: OwnerId, record: KycRecord) {
        info!(owner = %owner, level = ?record.level, "kyc registered");
        self.kyc_registry.insert(owner, record);
    }

    pub fn kyc_record(&self, owner: &OwnerId) -> Option<&KycRecord> {
        self.kyc_registry.get(owner)
    }

    pub fn set_blacklisted(&mut self, owner: OwnerId, blacklisted: bool) {
        if blacklisted {
            info!(owner = %owner, "owner blacklisted");
            self.blacklist.insert(owner);
        } else {
            info!(owner = %owner, "owner removed from blacklist");
            self.blacklist.remove(&owner);
        }
    }

    pub fn is_blacklisted(&self, owner: &OwnerId) -> bool {
        self.blacklist.contains(owner)
    }

    pub fn jurisdiction_allowed(&self, code: &str) -> bool {
        self.config.allowed_jurisdictions.contains(code)
    }

    // =========================================================================
    // Compliance checks (read-only)
    // =========================================================================

    /// Check that `owner` holds a valid, non-blacklisted KYC registration in
    /// an allowlisted jurisdiction. Fails closed on a missing record.
    pub fn check_owner(&self, owner: &OwnerId, now: Timestamp) -> PolicyResult<()> {
        if self.is_blacklisted(owner) {
            return Err(PolicyError::Blacklisted(owner.clone()));
        }

        let record = match self.kyc_registry.get(owner) {
            Some(record) => record,
            None if self.config.kyc_required => {
                return Err(PolicyError::NoKycRegistration(owner.clone()))
            }
            None => return Ok(()),
        };

        if let Some(expiry) = record.expires_at {
            if now > expiry {
                return Err(PolicyError::KycExpired {
                    owner: owner.clone(),
                    expired_at: expiry,
                });
            }
        }

        if record.level == KycLevel::Level0 {
            return Err(PolicyError::KycLevelNotAllowed);
        }

        if !record.is_valid(now) {
            return Err(PolicyError::KycNotApproved {
                owner: owner.clone(),
                status: record.status.to_string(),
            });
        }

        if !self.jurisdiction_allowed(&record.jurisdiction) {
            return Err(PolicyError::JurisdictionDenied(record.jurisdiction.clone()));
        }

        Ok(())
    }

    /// Check that spending `amount` now would keep `owner` within the daily
    /// and 30-day caps of their KYC tier.
    pub fn check_spend(&self, owner: &OwnerId, amount: Amount, now: Timestamp) -> PolicyResult<()> {
        let record = self
            .kyc_registry
            .get(owner)
            .ok_or_else(|| PolicyError::NoKycRegistration(owner.clone()))?;

        let daily_limit = record.level.daily_limit();
        if daily_limit != UNLIMITED {
            let used = self.daily_used(owner, now);
            if used.saturating_add(amount) > daily_limit {
                return Err(PolicyError::DailyLimitExceeded {
                    owner: owner.clone(),
                    limit: daily_limit,
                    used,
                    requested: amount,
                });
            }
        }

        let monthly_limit = record.level.monthly_limit();
        if monthly_limit != UNLIMITED {
            let used = self.monthly_used(owner, now);
            if used.saturating_add(amount) > monthly_limit {
                return Err(PolicyError::MonthlyLimitExceeded {
                    owner: owner.clone(),
                    limit: monthly_limit,
                    used,
                    requested: amount,
                });
            }
        }

        Ok(())
    }

    pub fn daily_used(&self, owner: &OwnerId, now: Timestamp) -> Amount {
        let bucket = day_bucket(now);
        *self
            .daily_spent
            .get(&(owner.clone(), bucket))
            .unwrap_or(&0)
    }

    pub fn monthly_used(&self, owner: &OwnerId, now: Timestamp) -> Amount {
        let bucket = window_bucket(now);
        *self
            .monthly_spent
            .get(&(owner.clone(), bucket))
            .unwrap_or(&0)
    }

    // =========================================================================
    // Spend accounting (commit time only)
    // =========================================================================

    /// Charge `amount` against `owner`'s limits. Called by the applier after
    /// a successful commit; rejected or conflicted transactions are never
    /// charged.
    pub fn record_spend(&mut self, owner: &OwnerId, amount: Amount, now: Timestamp) {
        let day = day_bucket(now);
        let window = window_bucket(now);
        *self
            .daily_spent
            .entry((owner.clone(), day))
            .or_insert(0) += amount;
        *self
            .monthly_spent
            .entry((owner.clone(), window))
            .or_insert(0) += amount;
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new(PolicyConfig::default())
    }
}

fn day_bucket(now: Timestamp) -> u64 {
    now / SECS_PER_DAY
}

fn window_bucket(now: Timestamp) -> u64 {
    now / (SECS_PER_DAY * DAYS_PER_WINDOW)
}
