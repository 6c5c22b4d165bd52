//! Reserve Gate
//!
//! Tracks `verified_reserves` and `total_supply` and answers whether a mint
//! of size N would exceed backing, given the freshest attestation.

use lib_types::{Amount, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{ReserveError, ReserveResult};

/// Default attestation freshness window: 6 hours.
pub const DEFAULT_FRESHNESS_WINDOW_SECS: u64 = 6 * 3_600;

/// Auditor-signed statement of fiat reserves.
///
/// Signature validation happens upstream (governance surface); by the time an
/// attestation reaches the gate it is trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub verified_reserves: Amount,
    pub attested_at: Timestamp,
    /// Hash commitment over the auditor's reserve statement.
    pub commitment: String,
}

/// Source of reserve attestations (pushed or pulled periodically).
pub trait AttestationSource: Send + Sync {
    fn latest(&self) -> Option<Attestation>;
}

/// Reserve gate configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveConfig {
    /// How long an attestation stays fresh, in seconds.
    pub freshness_window_secs: u64,
}

impl Default for ReserveConfig {
    fn default() -> Self {
        Self {
            freshness_window_secs: DEFAULT_FRESHNESS_WINDOW_SECS,
        }
    }
}

/// Full-reserve backing gate.
#[derive(Debug)]
pub struct ReserveGate {
    config: ReserveConfig,
    total_supply: Amount,
    latest_attestation: Option<Attestation>,
}

impl ReserveGate {
    pub fn new(config: ReserveConfig) -> Self {
        Self {
            config,
            total_supply: 0,
            latest_attestation: None,
        }
    }

    /// Rehydrate the supply counter from the persisted ledger.
    pub fn with_total_supply(mut self, total_supply: Amount) -> Self {
        self.total_supply = total_supply;
        self
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn verified_reserves(&self) -> Amount {
        self.latest_attestation
            .as_ref()
            .map(|a| a.verified_reserves)
            .unwrap_or(0)
    }

    pub fn latest_attestation(&self) -> Option<&Attestation> {
        self.latest_attestation.as_ref()
    }

    /// Replace the gate's view of reserves with a fresher attestation.
    ///
    /// Older attestations are ignored; the gate's view is monotone in
    /// attestation time.
    pub fn ingest(&mut self, attestation: Attestation) {
        let stale = self
            .latest_attestation
            .as_ref()
            .map(|current| attestation.attested_at < current.attested_at)
            .unwrap_or(false);
        if stale {
            return;
        }
        info!(
            reserves = attestation.verified_reserves,
            attested_at = attestation.attested_at,
            "reserve attestation ingested"
        );
        self.latest_attestation = Some(attestation);
    }

    // =========================================================================
    // Mint gating
    // =========================================================================

    /// Would minting `amount` keep supply within attested, fresh reserves?
    pub fn can_mint(&self, amount: Amount, now: Timestamp) -> ReserveResult<()> {
        let attestation = self
            .latest_attestation
            .as_ref()
            .ok_or(ReserveError::NoAttestation)?;

        let age = now.saturating_sub(attestation.attested_at);
        if age > self.config.freshness_window_secs {
            return Err(ReserveError::AttestationExpired {
                attested_at: attestation.attested_at,
                window_secs: self.config.freshness_window_secs,
            });
        }

        let would_have = self
            .total_supply
            .checked_add(amount)
            .ok_or(ReserveError::Overflow)?;
        if would_have > attestation.verified_reserves {
            return Err(ReserveError::ReserveExceeded {
                supply: self.total_supply,
                reserves: attestation.verified_reserves,
                requested: amount,
            });
        }

        Ok(())
    }

    // =========================================================================
    // Supply accounting (commit time only)
    // =========================================================================

    pub fn apply_mint(&mut self, amount: Amount) -> ReserveResult<()> {
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(ReserveError::Overflow)?;
        Ok(())
    }

    pub fn apply_burn(&mut self, amount: Amount) -> ReserveResult<()> {
        self.total_supply =
            self.total_supply
                .checked_sub(amount)
                .ok_or(ReserveError::Underflow {
                    supply: self.total_supply,
                    requested: amount,
                })?;
        Ok(())
    }
}

impl Default for ReserveGate {
    fn default() -> Self {
        Self::new(ReserveConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: Timestamp = 1_764_000_000;

    fn attested(reserves: Amount, at: Timestamp) -> Attestation {
        Attestation {
            verified_reserves: reserves,
            attested_at: at,
            commitment: "SHA256:test".to_string(),
        }
    }

    #[test]
    fn test_no_attestation_rejects() {
        let gate = ReserveGate::default();
        assert!(matches!(
            gate.can_mint(1, NOW),
            Err(ReserveError::NoAttestation)
        ));
    }

    #[test]
    fn test_can_mint_within_reserves() {
        let mut gate = ReserveGate::default();
        gate.ingest(attested(200_000, NOW));
        assert!(gate.can_mint(100_000, NOW).is_ok());
        assert!(gate.can_mint(200_000, NOW).is_ok());
    }

    #[test]
    fn test_mint_beyond_reserves_rejects() {
        let mut gate = ReserveGate::default();
        gate.ingest(attested(200_000, NOW));
        gate.apply_mint(150_000).unwrap();
        let result = gate.can_mint(100_000, NOW);
        assert!(matches!(result, Err(ReserveError::ReserveExceeded { .. })));
    }

    #[test]
    fn test_attestation_freshness_window() {
        let mut gate = ReserveGate::default();
        gate.ingest(attested(200_000, NOW));

        // inside the 6h window
        assert!(gate.can_mint(1, NOW + DEFAULT_FRESHNESS_WINDOW_SECS).is_ok());

        // one second past the window
        let result = gate.can_mint(1, NOW + DEFAULT_FRESHNESS_WINDOW_SECS + 1);
        assert!(matches!(
            result,
            Err(ReserveError::AttestationExpired { .. })
        ));
    }

    #[test]
    fn test_stale_attestation_ignored() {
        let mut gate = ReserveGate::default();
        gate.ingest(attested(200_000, NOW));
        gate.ingest(attested(50_000, NOW - 100));
        assert_eq!(gate.verified_reserves(), 200_000);
    }

    #[test]
    fn test_supply_accounting() {
        let mut gate = ReserveGate::default();
        gate.apply_mint(500).unwrap();
        gate.apply_mint(250).unwrap();
        assert_eq!(gate.total_supply(), 750);

        gate.apply_burn(750).unwrap();
        assert_eq!(gate.total_supply(), 0);

        let result = gate.apply_burn(1);
        assert!(matches!(result, Err(ReserveError::Underflow { .. })));
    }
}
