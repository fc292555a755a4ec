#![warn(missing_docs)]

//! Frontier Encoding - canonical binary encoding for signed messages
//!
//! Messages that are signed off-chain and verified by the world core must be
//! serialized identically on both sides. This crate provides that single
//! representation:
//!
//! ```text
//! u8 / u16 / u32 / u64 / u128   fixed width, little endian
//! bool                          one byte, 0 or 1
//! [u8; N]                       N raw bytes, no prefix
//! Vec<T>, [T], String, str      ULEB128 element count, then elements
//! Option<T>                     0 for None, 1 followed by the value
//! structs                       fields in declaration order, no padding
//! ```
//!
//! # Basic Usage
//!
//! ```rust
//! use frontier_encoding::{Decode, Decoder, Encode, FrontierEncodingError, from_bytes, to_bytes};
//! use std::io::Write;
//!
//! struct Ping {
//!     nonce: u64,
//!     memo: Vec<u8>,
//! }
//!
//! impl Encode for Ping {
//!     fn encode<W: Write>(&self, writer: &mut W) -> Result<(), FrontierEncodingError> {
//!         self.nonce.encode(writer)?;
//!         self.memo.encode(writer)
//!     }
//! }
//!
//! impl Decode for Ping {
//!     fn decode(decoder: &mut Decoder<'_>) -> Result<Self, FrontierEncodingError> {
//!         Ok(Ping {
//!             nonce: u64::decode(decoder)?,
//!             memo: Vec::decode(decoder)?,
//!         })
//!     }
//! }
//!
//! let bytes = to_bytes(&Ping { nonce: 1, memo: b"hi".to_vec() }).unwrap();
//! assert_eq!(bytes, [1, 0, 0, 0, 0, 0, 0, 0, 2, b'h', b'i']);
//!
//! let ping: Ping = from_bytes(&bytes).unwrap();
//! assert_eq!(ping.memo, b"hi");
//! ```

mod error;
pub use error::*;

mod decoder;
pub use decoder::*;

mod codec;
pub use codec::*;

#[cfg(test)]
mod tests {
    use crate::{Decode, Decoder, Encode, FrontierEncodingError, from_bytes, to_bytes};
    use anyhow::Result;
    use proptest::prelude::*;
    use std::io::Write;

    #[derive(Debug, Clone, PartialEq)]
    struct Envelope {
        sender: [u8; 32],
        amount: u64,
        memo: Vec<u8>,
        label: String,
        tag: Option<u32>,
        urgent: bool,
    }

    impl Encode for Envelope {
        fn encode<W: Write>(&self, writer: &mut W) -> Result<(), FrontierEncodingError> {
            self.sender.encode(writer)?;
            self.amount.encode(writer)?;
            self.memo.encode(writer)?;
            self.label.encode(writer)?;
            self.tag.encode(writer)?;
            self.urgent.encode(writer)
        }
    }

    impl Decode for Envelope {
        fn decode(decoder: &mut Decoder<'_>) -> Result<Self, FrontierEncodingError> {
            Ok(Envelope {
                sender: Decode::decode(decoder)?,
                amount: Decode::decode(decoder)?,
                memo: Decode::decode(decoder)?,
                label: Decode::decode(decoder)?,
                tag: Decode::decode(decoder)?,
                urgent: Decode::decode(decoder)?,
            })
        }
    }

    #[test]
    fn it_encodes_integers_little_endian() -> Result<()> {
        assert_eq!(to_bytes(&1u64)?, [1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(to_bytes(&0x0102_0304u32)?, [4, 3, 2, 1]);
        assert_eq!(to_bytes(&true)?, [1]);
        Ok(())
    }

    #[test]
    fn it_prefixes_byte_vectors_with_their_length() -> Result<()> {
        assert_eq!(to_bytes(&vec![7u8, 8, 9])?, [3, 7, 8, 9]);
        assert_eq!(to_bytes("abc")?, [3, b'a', b'b', b'c']);

        let long = vec![0u8; 200];
        let encoded = to_bytes(&long)?;
        assert_eq!(&encoded[..2], &[0xc8, 0x01]);
        assert_eq!(encoded.len(), 202);
        Ok(())
    }

    #[test]
    fn it_does_not_prefix_fixed_arrays() -> Result<()> {
        assert_eq!(to_bytes(&[5u8; 4])?, [5, 5, 5, 5]);
        Ok(())
    }

    #[test]
    fn it_changes_bytes_when_field_order_changes() -> Result<()> {
        let mut forward = Vec::new();
        1u64.encode(&mut forward)?;
        2u64.encode(&mut forward)?;

        let mut backward = Vec::new();
        2u64.encode(&mut backward)?;
        1u64.encode(&mut backward)?;

        assert_ne!(forward, backward);
        Ok(())
    }

    #[test]
    fn it_rejects_trailing_bytes() {
        let result: Result<u8, _> = from_bytes(&[1, 2]);
        assert!(matches!(result, Err(FrontierEncodingError::TrailingBytes(1))));
    }

    #[test]
    fn it_rejects_invalid_booleans_and_option_tags() {
        let result: Result<bool, _> = from_bytes(&[2]);
        assert!(matches!(result, Err(FrontierEncodingError::InvalidBool(2))));

        let result: Result<Option<u8>, _> = from_bytes(&[9, 0]);
        assert!(matches!(
            result,
            Err(FrontierEncodingError::InvalidOptionTag(9))
        ));
    }

    #[test]
    fn it_rejects_truncated_vectors() {
        // Claims 5 elements but carries 2.
        let result: Result<Vec<u8>, _> = from_bytes(&[5, 1, 2]);
        assert!(matches!(
            result,
            Err(FrontierEncodingError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn it_rejects_invalid_utf8() {
        let result: Result<String, _> = from_bytes(&[2, 0xff, 0xfe]);
        assert!(matches!(result, Err(FrontierEncodingError::InvalidUtf8(_))));
    }

    proptest! {
        #[test]
        fn it_decodes_what_it_encodes(
            sender in any::<[u8; 32]>(),
            amount in any::<u64>(),
            memo in proptest::collection::vec(any::<u8>(), 0..300),
            label in "[a-z]{0,24}",
            tag in any::<Option<u32>>(),
            urgent in any::<bool>(),
        ) {
            let envelope = Envelope { sender, amount, memo, label, tag, urgent };
            let bytes = to_bytes(&envelope).unwrap();
            let decoded: Envelope = from_bytes(&bytes).unwrap();
            prop_assert_eq!(decoded, envelope);
        }
    }
}
