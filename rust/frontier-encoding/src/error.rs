use thiserror::Error;

/// Errors that can occur while encoding or decoding canonical bytes.
///
/// Encoding into an in-memory buffer only fails if the underlying writer
/// fails. Decoding fails whenever the input does not describe exactly one
/// value of the requested type.
#[derive(Error, Debug)]
pub enum FrontierEncodingError {
    /// Writing encoded bytes to the output failed.
    #[error("Failed to write encoded bytes: {0}")]
    Write(#[from] std::io::Error),

    /// A ULEB128 length prefix was malformed or overflowed 64 bits.
    #[error("Failed to decode a length prefix: {0}")]
    LengthDecode(leb128::read::Error),

    /// The input ended before the value was complete.
    #[error("Unexpected end of input: needed {needed} bytes but {remaining} remain")]
    UnexpectedEnd {
        /// Bytes required by the value being decoded.
        needed: usize,
        /// Bytes left in the input.
        remaining: usize,
    },

    /// A length prefix exceeds what this platform can address.
    #[error("Length prefix {0} exceeds the addressable size")]
    LengthOverflow(u64),

    /// A boolean was encoded as something other than `0` or `1`.
    #[error("Invalid boolean byte {0:#04x}")]
    InvalidBool(u8),

    /// An optional value carried a tag other than `0` or `1`.
    #[error("Invalid option tag {0:#04x}")]
    InvalidOptionTag(u8),

    /// A string was not valid UTF-8.
    #[error("Invalid UTF-8 string: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// Bytes were left over after the top-level value was decoded.
    #[error("{0} trailing bytes after decoded value")]
    TrailingBytes(usize),
}

impl From<leb128::read::Error> for FrontierEncodingError {
    fn from(value: leb128::read::Error) -> Self {
        FrontierEncodingError::LengthDecode(value)
    }
}
