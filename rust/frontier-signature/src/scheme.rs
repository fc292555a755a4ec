//! Signature scheme flags.

use std::fmt;

use crate::FrontierSignatureError;

/// Signature schemes a blob may declare in its leading flag byte.
///
/// The flag fixes the length of the signature and of the public key that
/// follow it, so a blob is fully described by its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureScheme {
    /// Ed25519: 64-byte signature, 32-byte public key.
    Ed25519,
    /// ECDSA over secp256k1 with SHA-256: 64-byte compact signature,
    /// 33-byte compressed SEC1 public key.
    Secp256k1,
    /// ECDSA over secp256r1 (P-256) with SHA-256: 64-byte compact
    /// signature, 33-byte compressed SEC1 public key.
    Secp256r1,
}

impl SignatureScheme {
    /// Every supported scheme.
    pub const ALL: [SignatureScheme; 3] = [
        SignatureScheme::Ed25519,
        SignatureScheme::Secp256k1,
        SignatureScheme::Secp256r1,
    ];

    /// The flag byte that selects this scheme.
    pub const fn flag(&self) -> u8 {
        match self {
            SignatureScheme::Ed25519 => 0x00,
            SignatureScheme::Secp256k1 => 0x01,
            SignatureScheme::Secp256r1 => 0x02,
        }
    }

    /// Resolve a flag byte.
    pub fn from_flag(flag: u8) -> Result<Self, FrontierSignatureError> {
        match flag {
            0x00 => Ok(SignatureScheme::Ed25519),
            0x01 => Ok(SignatureScheme::Secp256k1),
            0x02 => Ok(SignatureScheme::Secp256r1),
            other => Err(FrontierSignatureError::UnsupportedScheme(other)),
        }
    }

    /// Length of a raw signature under this scheme.
    pub const fn signature_len(&self) -> usize {
        64
    }

    /// Length of a raw public key under this scheme.
    pub const fn public_key_len(&self) -> usize {
        match self {
            SignatureScheme::Ed25519 => 32,
            SignatureScheme::Secp256k1 | SignatureScheme::Secp256r1 => 33,
        }
    }

    /// Length of a complete blob: flag, signature, public key.
    pub const fn blob_len(&self) -> usize {
        1 + self.signature_len() + self.public_key_len()
    }
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignatureScheme::Ed25519 => "ed25519",
            SignatureScheme::Secp256k1 => "secp256k1",
            SignatureScheme::Secp256r1 => "secp256r1",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_round_trips_every_flag() {
        for scheme in SignatureScheme::ALL {
            assert_eq!(
                SignatureScheme::from_flag(scheme.flag()).ok(),
                Some(scheme)
            );
        }
    }

    #[test]
    fn it_rejects_unknown_flags() {
        assert!(matches!(
            SignatureScheme::from_flag(0x05),
            Err(FrontierSignatureError::UnsupportedScheme(0x05))
        ));
    }

    #[test]
    fn it_knows_blob_lengths() {
        assert_eq!(SignatureScheme::Ed25519.blob_len(), 97);
        assert_eq!(SignatureScheme::Secp256k1.blob_len(), 98);
        assert_eq!(SignatureScheme::Secp256r1.blob_len(), 98);
    }
}
