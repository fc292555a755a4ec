//! Producing self-describing signature blobs.
//!
//! The world core only verifies. Signing is what the trusted off-chain
//! server does when it attests a location, and what tests do to build
//! proofs; both need blobs laid out exactly as the verifier expects.

use frontier_common::Address;

use crate::{FrontierSignatureError, SignatureScheme, derive_address, message_digest};

/// Signing key for one of the supported schemes.
#[derive(Clone)]
pub enum Signer {
    /// Ed25519 key.
    Ed25519(ed25519_dalek::SigningKey),
    /// secp256k1 ECDSA key.
    Secp256k1(k256::ecdsa::SigningKey),
    /// secp256r1 ECDSA key.
    Secp256r1(p256::ecdsa::SigningKey),
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.debug_struct("Signer")
            .field("scheme", &self.scheme())
            .field("address", &self.address())
            .finish()
    }
}

impl Signer {
    /// Build a key deterministically from a 32-byte seed.
    ///
    /// # Errors
    ///
    /// ECDSA seeds must be a valid non-zero scalar; anything else is
    /// [`FrontierSignatureError::InvalidKey`].
    pub fn from_seed(scheme: SignatureScheme, seed: [u8; 32]) -> Result<Self, FrontierSignatureError> {
        match scheme {
            SignatureScheme::Ed25519 => {
                Ok(Signer::Ed25519(ed25519_dalek::SigningKey::from_bytes(&seed)))
            }
            SignatureScheme::Secp256k1 => k256::ecdsa::SigningKey::from_slice(&seed)
                .map(Signer::Secp256k1)
                .map_err(|e| FrontierSignatureError::InvalidKey(e.to_string())),
            SignatureScheme::Secp256r1 => p256::ecdsa::SigningKey::from_slice(&seed)
                .map(Signer::Secp256r1)
                .map_err(|e| FrontierSignatureError::InvalidKey(e.to_string())),
        }
    }

    /// Generate a fresh key with seed bytes from the operating system.
    ///
    /// # Errors
    ///
    /// Returns an error if the RNG fails.
    pub fn generate(scheme: SignatureScheme) -> Result<Self, FrontierSignatureError> {
        let mut seed = [0u8; 32];
        getrandom::getrandom(&mut seed)?;
        Self::from_seed(scheme, seed)
    }

    /// The scheme this key signs under.
    pub fn scheme(&self) -> SignatureScheme {
        match self {
            Signer::Ed25519(_) => SignatureScheme::Ed25519,
            Signer::Secp256k1(_) => SignatureScheme::Secp256k1,
            Signer::Secp256r1(_) => SignatureScheme::Secp256r1,
        }
    }

    /// Raw public key bytes (compressed SEC1 for ECDSA schemes).
    pub fn public_key(&self) -> Vec<u8> {
        match self {
            Signer::Ed25519(key) => key.verifying_key().to_bytes().to_vec(),
            Signer::Secp256k1(key) => key
                .verifying_key()
                .to_encoded_point(true)
                .as_bytes()
                .to_vec(),
            Signer::Secp256r1(key) => key
                .verifying_key()
                .to_encoded_point(true)
                .as_bytes()
                .to_vec(),
        }
    }

    /// The address verifiers will expect for this key.
    pub fn address(&self) -> Address {
        derive_address(self.scheme(), &self.public_key())
    }

    /// Sign `message` and return a `flag ‖ signature ‖ public_key` blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be encoded or the curve
    /// implementation fails to sign.
    pub fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, FrontierSignatureError> {
        let digest = message_digest(message)?;

        let signature: Vec<u8> = match self {
            Signer::Ed25519(key) => {
                use signature::Signer as _;
                key.try_sign(digest.as_ref())
                    .map_err(|e| FrontierSignatureError::SigningFailed(e.to_string()))?
                    .to_bytes()
                    .to_vec()
            }
            Signer::Secp256k1(key) => {
                use k256::ecdsa::Signature;
                use signature::Signer as _;
                let signature: Signature = key
                    .try_sign(digest.as_ref())
                    .map_err(|e| FrontierSignatureError::SigningFailed(e.to_string()))?;
                signature.to_bytes().to_vec()
            }
            Signer::Secp256r1(key) => {
                use p256::ecdsa::Signature;
                use signature::Signer as _;
                let signature: Signature = key
                    .try_sign(digest.as_ref())
                    .map_err(|e| FrontierSignatureError::SigningFailed(e.to_string()))?;
                signature.to_bytes().to_vec()
            }
        };

        let scheme = self.scheme();
        let mut blob = Vec::with_capacity(scheme.blob_len());
        blob.push(scheme.flag());
        blob.extend_from_slice(&signature);
        blob.extend_from_slice(&self.public_key());
        Ok(blob)
    }
}
