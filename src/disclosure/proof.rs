//! Disclosure proofs.
//!
//! The disclosure capability signs
//! `SHA-256(DOMAIN ‖ request_id (le u64) ‖ n (le u32) ‖ cleartextsᵢ (le u32))`
//! with Ed25519. The core only ever holds the verifying half.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use super::RequestId;

const DOMAIN: &[u8] = b"bubble-lens/disclosure/v1";

fn digest(request_id: RequestId, cleartexts: &[u32]) -> [u8; 32] {
    let mut h = Sha256::new();
    h.update(DOMAIN);
    h.update(request_id.0.to_le_bytes());
    h.update((cleartexts.len() as u32).to_le_bytes());
    for value in cleartexts {
        h.update(value.to_le_bytes());
    }
    h.finalize().into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisclosureProof([u8; 64]);

impl DisclosureProof {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        self.0
    }
}

/// Signing side, held by whoever performs decryption.
pub struct DisclosureSigner {
    key: SigningKey,
}

impl DisclosureSigner {
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn from_bytes(secret: &[u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(secret),
        }
    }

    pub fn sign(&self, request_id: RequestId, cleartexts: &[u32]) -> DisclosureProof {
        let signature = self.key.sign(&digest(request_id, cleartexts));
        DisclosureProof(signature.to_bytes())
    }

    pub fn verifier(&self) -> DisclosureVerifier {
        DisclosureVerifier {
            key: self.key.verifying_key(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DisclosureVerifier {
    key: VerifyingKey,
}

impl DisclosureVerifier {
    /// True only if `proof` was produced for exactly these cleartexts under
    /// this request id.
    pub fn verify(&self, request_id: RequestId, cleartexts: &[u32], proof: &DisclosureProof) -> bool {
        let signature = Signature::from_bytes(&proof.0);
        self.key
            .verify_strict(&digest(request_id, cleartexts), &signature)
            .is_ok()
    }
}
