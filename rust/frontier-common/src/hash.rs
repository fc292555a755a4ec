use std::array::TryFromSliceError;

use serde::{Deserialize, Serialize};

/// The size of a BLAKE3 digest in bytes.
pub const DIGEST_SIZE: usize = 32;

/// A BLAKE3 digest.
///
/// Used for address derivation, entity id derivation and as the message
/// digest that signatures commit to.
///
/// # Examples
///
/// ```rust
/// use frontier_common::Digest;
///
/// let whole = Digest::of(b"hello world");
/// let parts = Digest::of_parts([b"hello ".as_slice(), b"world".as_slice()]);
/// assert_eq!(whole, parts);
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Digest([u8; DIGEST_SIZE]);

impl Digest {
    /// Computes the BLAKE3 digest of the given bytes.
    pub fn of(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).into())
    }

    /// Computes the digest of the concatenation of `parts` without
    /// allocating the concatenation.
    pub fn of_parts<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(part);
        }
        Self(hasher.finalize().into())
    }

    /// The raw digest.
    pub fn bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// Unwrap into the raw digest.
    pub fn into_bytes(self) -> [u8; DIGEST_SIZE] {
        self.0
    }
}

impl From<[u8; DIGEST_SIZE]> for Digest {
    fn from(value: [u8; DIGEST_SIZE]) -> Self {
        Digest(value)
    }
}

impl TryFrom<&[u8]> for Digest {
    type Error = TryFromSliceError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Ok(Digest(value.try_into()?))
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
