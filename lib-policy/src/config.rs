//! Policy Configuration
//!
//! Versioned policy parameters. These are data, not code: the validator asks
//! the policy engine, never hard-codes a threshold.

use lib_types::Amount;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default active policy version.
pub const DEFAULT_POLICY_VERSION: &str = "POLICY_V1.0";

/// Versioned compliance and business-rule parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Active policy version; transactions reference this.
    pub policy_version: String,
    /// Minimum redemption size, in cents.
    pub min_burn_amount: Amount,
    /// Maximum total minted per transaction, in cents.
    pub max_mint_per_tx: Amount,
    /// ISO country codes permitted to hold outputs.
    pub allowed_jurisdictions: HashSet<String>,
    /// Whether KYC registration is required at all.
    pub kyc_required: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            policy_version: DEFAULT_POLICY_VERSION.to_string(),
            min_burn_amount: 100_000,          // $1,000 minimum redemption
            max_mint_per_tx: 10_000_000_000,   // $100M per transaction
            allowed_jurisdictions: ["US", "GB", "SG", "JP", "CH"]
                .into_iter()
                .map(String::from)
                .collect(),
            kyc_required: true,
        }
    }
}

impl PolicyConfig {
    /// Relaxed limits for unit tests.
    pub fn for_testing() -> Self {
        Self {
            min_burn_amount: 0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let config = PolicyConfig::default();
        assert_eq!(config.policy_version, DEFAULT_POLICY_VERSION);
        assert!(config.allowed_jurisdictions.contains("US"));
        assert!(!config.allowed_jurisdictions.contains("XX"));
        assert!(config.min_burn_amount > 0);
    }
}
