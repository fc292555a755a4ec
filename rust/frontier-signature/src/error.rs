use frontier_encoding::FrontierEncodingError;
use thiserror::Error;

/// Errors raised while parsing, producing or verifying signatures.
///
/// A signature that parses but does not verify is *not* an error: the
/// verifier reports it as `Ok(false)` so callers decide how to fail.
#[derive(Debug, Error)]
pub enum FrontierSignatureError {
    /// The signature blob does not have the length its scheme requires.
    #[error("Invalid signature length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Length required by the scheme flag.
        expected: usize,
        /// Length of the blob that was presented.
        actual: usize,
    },

    /// The scheme flag does not name a supported signature scheme.
    #[error("Unsupported signature scheme flag {0:#04x}")]
    UnsupportedScheme(u8),

    /// The message could not be canonically encoded.
    #[error("Failed to encode signed message: {0}")]
    Encoding(#[from] FrontierEncodingError),

    /// Key material was rejected by the underlying curve implementation.
    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    /// The signing operation itself failed.
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Random number generation failed while generating a key.
    #[error("RNG error: {0}")]
    Rng(getrandom::Error),
}

impl From<getrandom::Error> for FrontierSignatureError {
    fn from(error: getrandom::Error) -> Self {
        FrontierSignatureError::Rng(error)
    }
}
