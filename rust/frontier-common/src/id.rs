//! 32-byte identifiers: principal addresses and entity ids.

use std::{fmt, str::FromStr};

use frontier_encoding::{Decode, Decoder, Encode, FrontierEncodingError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::Digest;

/// Errors produced when parsing an identifier from its hex form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IdentifierParseError {
    /// The string is not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// The decoded bytes are not 32 bytes long.
    #[error("expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name([u8; 32]);

        impl $name {
            /// The all-zero value.
            pub const ZERO: Self = Self([0u8; 32]);

            /// Wrap raw bytes.
            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// The raw bytes.
            pub const fn bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Returns `true` for the all-zero value.
            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; 32]
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl From<Digest> for $name {
            fn from(digest: Digest) -> Self {
                Self(digest.into_bytes())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({self})", stringify!($name))
            }
        }

        impl FromStr for $name {
            type Err = IdentifierParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let digits = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(digits)?;
                let array = <[u8; 32]>::try_from(bytes.as_slice())
                    .map_err(|_| IdentifierParseError::InvalidLength(bytes.len()))?;
                Ok(Self(array))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                text.parse().map_err(serde::de::Error::custom)
            }
        }

        impl Encode for $name {
            fn encode<W: std::io::Write>(&self, writer: &mut W) -> Result<(), FrontierEncodingError> {
                self.0.encode(writer)
            }
        }

        impl Decode for $name {
            fn decode(decoder: &mut Decoder<'_>) -> Result<Self, FrontierEncodingError> {
                Ok(Self(decoder.read_array()?))
            }
        }
    };
}

identifier! {
    /// The address of a principal: a player, an admin or an off-chain
    /// server. Derived from a public key by the signature crate.
    Address
}

identifier! {
    /// The identity of an entity living in the world: a character, an
    /// assembly, an item object, a capability.
    EntityId
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    #[test]
    fn it_displays_as_prefixed_hex() {
        let address = Address::new([0xab; 32]);
        assert_eq!(address.to_string(), format!("0x{}", "ab".repeat(32)));
    }

    #[test]
    fn it_parses_with_and_without_prefix() -> TestResult {
        let id = EntityId::new([1; 32]);
        assert_eq!(id.to_string().parse::<EntityId>()?, id);
        assert_eq!("01".repeat(32).parse::<EntityId>()?, id);
        Ok(())
    }

    #[test]
    fn it_rejects_short_identifiers() {
        let result = "0xabcd".parse::<Address>();
        assert_eq!(result, Err(IdentifierParseError::InvalidLength(2)));
    }

    #[test]
    fn it_serializes_through_json_as_a_string() -> TestResult {
        let address = Address::new([9; 32]);
        let json = serde_json::to_string(&address)?;
        assert_eq!(json, format!("\"{address}\""));
        assert_eq!(serde_json::from_str::<Address>(&json)?, address);
        Ok(())
    }

    #[test]
    fn it_encodes_without_a_length_prefix() -> TestResult {
        let bytes = frontier_encoding::to_bytes(&EntityId::new([3; 32]))?;
        assert_eq!(bytes, vec![3u8; 32]);
        Ok(())
    }
}
