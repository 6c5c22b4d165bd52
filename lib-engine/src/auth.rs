//! Signature Authorization Capability
//!
//! The validator asks a [`SignatureVerifier`] whether a signature binds a
//! principal to the transaction payload; the key scheme stays behind the
//! trait. [`Ed25519Verifier`] is the production implementation;
//! [`AllowAllVerifier`] exists for tests and demos.

use std::collections::HashMap;

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use parking_lot::RwLock;
use tracing::warn;

use lib_types::{CapabilityError, OwnerId};

/// Signature authorization capability.
///
/// `Ok(true)` means the signature binds `principal` to `message`;
/// `Ok(false)` means it does not; `Err` means the capability itself failed
/// (treated as transient).
pub trait SignatureVerifier: Send + Sync {
    fn verify(
        &self,
        message: &[u8],
        signature: &[u8],
        principal: &OwnerId,
    ) -> Result<bool, CapabilityError>;
}

/// Ed25519 verifier over a registry of enrolled public keys.
///
/// Enrollment (binding an owner identity to a key) happens out of band; the
/// verifier only holds the resulting map. An unknown principal or a
/// malformed signature verifies as `false`, never as an error.
#[derive(Default)]
pub struct Ed25519Verifier {
    keys: RwLock<HashMap<OwnerId, VerifyingKey>>,
}

impl Ed25519Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, principal: OwnerId, key: VerifyingKey) {
        self.keys.write().insert(principal, key);
    }

    /// Register a key from its 32-byte hex form, as enrollment records carry
    /// it.
    pub fn register_hex(&self, principal: OwnerId, key_hex: &str) -> Result<(), CapabilityError> {
        let bytes = hex::decode(key_hex)
            .map_err(|e| CapabilityError::unavailable("ed25519", e.to_string()))?;
        let key = VerifyingKey::try_from(bytes.as_slice())
            .map_err(|e| CapabilityError::unavailable("ed25519", e.to_string()))?;
        self.keys.write().insert(principal, key);
        Ok(())
    }
}

impl SignatureVerifier for Ed25519Verifier {
    fn verify(
        &self,
        message: &[u8],
        signature: &[u8],
        principal: &OwnerId,
    ) -> Result<bool, CapabilityError> {
        let keys = self.keys.read();
        let key = match keys.get(principal) {
            Some(key) => key,
            None => {
                warn!(principal = %principal, "no enrolled key for principal");
                return Ok(false);
            }
        };
        let signature = match Signature::try_from(signature) {
            Ok(sig) => sig,
            Err(_) => return Ok(false),
        };
        Ok(key.verify(message, &signature).is_ok())
    }
}

/// Accepts any non-empty signature. Tests and demos only.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllVerifier;

impl SignatureVerifier for AllowAllVerifier {
    fn verify(
        &self,
        _message: &[u8],
        signature: &[u8],
        _principal: &OwnerId,
    ) -> Result<bool, CapabilityError> {
        Ok(!signature.is_empty())
    }
}
