//! Policy Engine Errors

use lib_types::{Amount, OwnerId};
use thiserror::Error;

/// Error during compliance checks.
///
/// Every variant is fatal for the transaction being validated; none of these
/// are retryable against the same snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Owner {0} has no KYC registration")]
    NoKycRegistration(OwnerId),

    #[error("KYC record for {owner} is not approved (status: {status})")]
    KycNotApproved { owner: OwnerId, status: String },

    #[error("KYC record for {owner} expired at {expired_at}")]
    KycExpired { owner: OwnerId, expired_at: u64 },

    #[error("KYC level 0 is not allowed to transact")]
    KycLevelNotAllowed,

    #[error("Owner {0} is blacklisted")]
    Blacklisted(OwnerId),

    #[error("Jurisdiction {0} not allowed")]
    JurisdictionDenied(String),

    #[error("Daily limit exceeded for {owner}: limit {limit}, used {used}, requested {requested}")]
    DailyLimitExceeded {
        owner: OwnerId,
        limit: Amount,
        used: Amount,
        requested: Amount,
    },

    #[error("Monthly limit exceeded for {owner}: limit {limit}, used {used}, requested {requested}")]
    MonthlyLimitExceeded {
        owner: OwnerId,
        limit: Amount,
        used: Amount,
        requested: Amount,
    },
}

/// Result type for policy operations
pub type PolicyResult<T> = Result<T, PolicyError>;
