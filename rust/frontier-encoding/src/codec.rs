use std::io::Write;

use crate::{Decoder, FrontierEncodingError};

/// A value with a single canonical byte representation.
///
/// Implementations write their fields in a fixed order. Changing that order,
/// or the type of any field, changes every digest computed over the output.
pub trait Encode {
    /// Write the canonical bytes of this value to `writer`.
    fn encode<W: Write>(&self, writer: &mut W) -> Result<(), FrontierEncodingError>;
}

/// A value that can be read back from its canonical representation.
pub trait Decode: Sized {
    /// Read one value from the decoder.
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, FrontierEncodingError>;
}

/// Write a ULEB128 length prefix.
pub fn write_length<W: Write>(writer: &mut W, length: usize) -> Result<(), FrontierEncodingError> {
    leb128::write::unsigned(writer, length as u64)?;
    Ok(())
}

/// Encode a value into a freshly allocated buffer.
pub fn to_bytes<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>, FrontierEncodingError> {
    let mut buffer = Vec::new();
    value.encode(&mut buffer)?;
    Ok(buffer)
}

/// Decode exactly one value from `bytes`, rejecting trailing input.
pub fn from_bytes<T: Decode>(bytes: &[u8]) -> Result<T, FrontierEncodingError> {
    let mut decoder = Decoder::new(bytes);
    let value = T::decode(&mut decoder)?;
    decoder.finish()?;
    Ok(value)
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<(), FrontierEncodingError> {
        (**self).encode(writer)
    }
}

impl Encode for u8 {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<(), FrontierEncodingError> {
        writer.write_all(&[*self])?;
        Ok(())
    }
}

impl Decode for u8 {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, FrontierEncodingError> {
        decoder.read_u8()
    }
}

macro_rules! little_endian {
    ($($ty:ty),*) => {
        $(
            impl Encode for $ty {
                fn encode<W: Write>(&self, writer: &mut W) -> Result<(), FrontierEncodingError> {
                    writer.write_all(&self.to_le_bytes())?;
                    Ok(())
                }
            }

            impl Decode for $ty {
                fn decode(decoder: &mut Decoder<'_>) -> Result<Self, FrontierEncodingError> {
                    Ok(<$ty>::from_le_bytes(decoder.read_array()?))
                }
            }
        )*
    };
}

little_endian!(u16, u32, u64, u128);

impl Encode for bool {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<(), FrontierEncodingError> {
        u8::from(*self).encode(writer)
    }
}

impl Decode for bool {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, FrontierEncodingError> {
        match decoder.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(FrontierEncodingError::InvalidBool(other)),
        }
    }
}

// Fixed-size byte arrays carry no length prefix.
impl<const N: usize> Encode for [u8; N] {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<(), FrontierEncodingError> {
        writer.write_all(self)?;
        Ok(())
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, FrontierEncodingError> {
        decoder.read_array()
    }
}

impl<T: Encode> Encode for [T] {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<(), FrontierEncodingError> {
        write_length(writer, self.len())?;
        for element in self {
            element.encode(writer)?;
        }
        Ok(())
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<(), FrontierEncodingError> {
        self.as_slice().encode(writer)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, FrontierEncodingError> {
        let length = decoder.read_length()?;
        // Every element occupies at least one byte, so the remaining input
        // bounds the allocation even when the prefix is hostile.
        let mut elements = Vec::with_capacity(length.min(decoder.remaining()));
        for _ in 0..length {
            elements.push(T::decode(decoder)?);
        }
        Ok(elements)
    }
}

impl Encode for str {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<(), FrontierEncodingError> {
        self.as_bytes().encode(writer)
    }
}

impl Encode for String {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<(), FrontierEncodingError> {
        self.as_str().encode(writer)
    }
}

impl Decode for String {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, FrontierEncodingError> {
        let bytes = decoder.read_bytes()?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<(), FrontierEncodingError> {
        match self {
            None => 0u8.encode(writer),
            Some(value) => {
                1u8.encode(writer)?;
                value.encode(writer)
            }
        }
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, FrontierEncodingError> {
        match decoder.read_u8()? {
            0 => Ok(None),
            1 => Ok(Some(T::decode(decoder)?)),
            other => Err(FrontierEncodingError::InvalidOptionTag(other)),
        }
    }
}
