use crate::FrontierEncodingError;

/// A forward-only reader over canonically encoded bytes.
///
/// Every `read_*` method either consumes exactly the bytes of the value it
/// returns or fails without consuming anything the caller could observe.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Decoder<'a> {
    /// Create a decoder positioned at the start of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// Returns `true` when every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Read a slice of exactly `len` bytes.
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], FrontierEncodingError> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(FrontierEncodingError::UnexpectedEnd {
                needed: len,
                remaining,
            });
        }

        let bytes: &'a [u8] = self.bytes;
        let slice = &bytes[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    /// Read a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], FrontierEncodingError> {
        let slice = self.read_slice(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, FrontierEncodingError> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    /// Read a ULEB128 length prefix.
    pub fn read_length(&mut self) -> Result<usize, FrontierEncodingError> {
        let mut rest = &self.bytes[self.position..];
        let before = rest.len();
        let length = leb128::read::unsigned(&mut rest)?;
        self.position += before - rest.len();

        usize::try_from(length).map_err(|_| FrontierEncodingError::LengthOverflow(length))
    }

    /// Read a length-prefixed byte vector.
    pub fn read_bytes(&mut self) -> Result<&'a [u8], FrontierEncodingError> {
        let length = self.read_length()?;
        self.read_slice(length)
    }

    /// Fail unless every byte has been consumed.
    pub fn finish(self) -> Result<(), FrontierEncodingError> {
        match self.remaining() {
            0 => Ok(()),
            trailing => Err(FrontierEncodingError::TrailingBytes(trailing)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_reads_multi_byte_length_prefixes() -> anyhow::Result<()> {
        let mut decoder = Decoder::new(&[0xc8, 0x01, 0xff]);
        assert_eq!(decoder.read_length()?, 200);
        assert_eq!(decoder.remaining(), 1);
        Ok(())
    }

    #[test]
    fn it_refuses_to_read_past_the_end() {
        let mut decoder = Decoder::new(&[1, 2]);
        let result = decoder.read_array::<4>();
        assert!(matches!(
            result,
            Err(FrontierEncodingError::UnexpectedEnd {
                needed: 4,
                remaining: 2
            })
        ));
        // Nothing was consumed by the failed read.
        assert_eq!(decoder.remaining(), 2);
    }

    #[test]
    fn it_reports_trailing_bytes_on_finish() {
        let mut decoder = Decoder::new(&[7, 8, 9]);
        let _ = decoder.read_u8();
        assert!(matches!(
            decoder.finish(),
            Err(FrontierEncodingError::TrailingBytes(2))
        ));
    }
}
