//! Address derivation and two-phase signature verification.

use frontier_common::{Address, Digest};
use frontier_encoding::Encode;

use crate::{FrontierSignatureError, SignatureScheme};

/// Domain separation tag prepended to every signed message.
///
/// Scope `0x03` (personal message), version `0x00`, application `0x00`.
pub const INTENT_PREFIX: [u8; 3] = [0x03, 0x00, 0x00];

/// Derive the address that owns `public_key` under `scheme`.
///
/// The address is the digest of the scheme flag followed by the raw key,
/// so the same key bytes under two schemes never collide.
pub fn derive_address(scheme: SignatureScheme, public_key: &[u8]) -> Address {
    Digest::of_parts([[scheme.flag()].as_slice(), public_key]).into()
}

/// The digest a signer commits to for `message`.
///
/// The message is encoded as a length-prefixed byte vector and prefixed with
/// [`INTENT_PREFIX`] before hashing.
pub fn message_digest(message: &[u8]) -> Result<Digest, FrontierSignatureError> {
    let mut buffer = Vec::with_capacity(INTENT_PREFIX.len() + message.len() + 10);
    buffer.extend_from_slice(&INTENT_PREFIX);
    message.encode(&mut buffer)?;
    Ok(Digest::of(&buffer))
}

/// A parsed `flag ‖ signature ‖ public_key` blob.
#[derive(Debug, Clone, Copy)]
pub struct SignatureBlob<'a> {
    scheme: SignatureScheme,
    signature: &'a [u8],
    public_key: &'a [u8],
}

impl<'a> SignatureBlob<'a> {
    /// Split a blob into its parts.
    ///
    /// # Errors
    ///
    /// - [`FrontierSignatureError::InvalidLength`] if the blob is empty or its
    ///   length disagrees with the scheme named by the flag.
    /// - [`FrontierSignatureError::UnsupportedScheme`] for an unknown flag.
    pub fn parse(blob: &'a [u8]) -> Result<Self, FrontierSignatureError> {
        let (&flag, rest) = blob
            .split_first()
            .ok_or(FrontierSignatureError::InvalidLength {
                expected: 1,
                actual: 0,
            })?;
        let scheme = SignatureScheme::from_flag(flag)?;

        if blob.len() != scheme.blob_len() {
            return Err(FrontierSignatureError::InvalidLength {
                expected: scheme.blob_len(),
                actual: blob.len(),
            });
        }

        let (signature, public_key) = rest.split_at(scheme.signature_len());
        Ok(Self {
            scheme,
            signature,
            public_key,
        })
    }

    /// Scheme named by the flag byte.
    pub fn scheme(&self) -> SignatureScheme {
        self.scheme
    }

    /// Raw signature bytes.
    pub fn signature(&self) -> &'a [u8] {
        self.signature
    }

    /// Raw public key bytes.
    pub fn public_key(&self) -> &'a [u8] {
        self.public_key
    }

    /// The address of the embedded public key.
    pub fn signer(&self) -> Address {
        derive_address(self.scheme, self.public_key)
    }

    /// Check the signature over a precomputed digest.
    ///
    /// Malformed keys and signatures verify as `false`.
    pub fn verify_digest(&self, digest: &Digest) -> bool {
        match self.scheme {
            SignatureScheme::Ed25519 => verify_ed25519(self.public_key, self.signature, digest),
            SignatureScheme::Secp256k1 => verify_k256(self.public_key, self.signature, digest),
            SignatureScheme::Secp256r1 => verify_p256(self.public_key, self.signature, digest),
        }
    }
}

/// Verify that `blob` is a signature over `message` by `expected_address`.
///
/// Identity is checked before any curve arithmetic: if the address derived
/// from the embedded key is not `expected_address` this returns `Ok(false)`
/// without verifying the signature.
///
/// # Errors
///
/// Structural problems with the blob are errors (see
/// [`SignatureBlob::parse`]); a signature that simply does not verify is
/// `Ok(false)`.
pub fn verify_signature(
    message: &[u8],
    blob: &[u8],
    expected_address: &Address,
) -> Result<bool, FrontierSignatureError> {
    let blob = SignatureBlob::parse(blob)?;

    let signer = blob.signer();
    if &signer != expected_address {
        tracing::trace!(%signer, expected = %expected_address, "signer address mismatch");
        return Ok(false);
    }

    let digest = message_digest(message)?;
    let verified = blob.verify_digest(&digest);
    tracing::trace!(scheme = %blob.scheme(), %signer, verified, "signature checked");
    Ok(verified)
}

fn verify_ed25519(public_key: &[u8], signature: &[u8], digest: &Digest) -> bool {
    let Ok(public_key) = <[u8; 32]>::try_from(public_key) else {
        return false;
    };
    let Ok(signature) = <[u8; 64]>::try_from(signature) else {
        return false;
    };
    let Ok(key) = ed25519_dalek::VerifyingKey::from_bytes(&public_key) else {
        return false;
    };
    let signature = ed25519_dalek::Signature::from_bytes(&signature);
    key.verify_strict(digest.as_ref(), &signature).is_ok()
}

fn verify_k256(public_key: &[u8], signature: &[u8], digest: &Digest) -> bool {
    use k256::ecdsa::{Signature, VerifyingKey};
    use signature::Verifier;

    let Ok(key) = VerifyingKey::from_sec1_bytes(public_key) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    key.verify(digest.as_ref(), &signature).is_ok()
}

fn verify_p256(public_key: &[u8], signature: &[u8], digest: &Digest) -> bool {
    use p256::ecdsa::{Signature, VerifyingKey};
    use signature::Verifier;

    let Ok(key) = VerifyingKey::from_sec1_bytes(public_key) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    key.verify(digest.as_ref(), &signature).is_ok()
}
