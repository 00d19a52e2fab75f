// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ed25519 verification of Discord interaction callbacks.
//!
//! Discord signs `timestamp + rawBody` with the application's key; callbacks
//! that do not verify against the configured public key must never reach the
//! interaction router.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};

use belay_core::BelayError;

/// Verifier bound to one application public key.
#[derive(Clone)]
pub struct SignatureVerifier {
    public_key: VerifyingKey,
}

impl SignatureVerifier {
    /// Build a verifier from the hex-encoded public key Discord displays in
    /// the application portal.
    pub fn from_hex(public_key_hex: &str) -> Result<Self, BelayError> {
        let bytes = hex::decode(public_key_hex)
            .map_err(|e| BelayError::Signature(format!("public key is not hex: {e}")))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| BelayError::Signature("public key must be 32 bytes".to_string()))?;
        let public_key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| BelayError::Signature(format!("invalid public key: {e}")))?;
        Ok(Self { public_key })
    }

    /// Verify a callback: the signature must cover `timestamp + body`.
    pub fn verify(&self, timestamp: &str, body: &str, signature_hex: &str) -> bool {
        let Ok(sig_bytes) = hex::decode(signature_hex) else {
            return false;
        };
        let Ok(sig_array) = <[u8; 64]>::try_from(sig_bytes.as_slice()) else {
            return false;
        };
        let signature = Signature::from_bytes(&sig_array);
        let message = format!("{timestamp}{body}");
        self.public_key.verify(message.as_bytes(), &signature).is_ok()
    }
}
