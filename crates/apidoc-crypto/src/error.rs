//! Cryptographic error types.

use thiserror::Error;

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The signing secret is empty.
    #[error("signing secret must not be empty")]
    EmptySecret,

    /// The key could not be used to initialise a MAC.
    #[error("invalid key length: {0}")]
    InvalidKeyLength(String),

    /// Unknown signing algorithm name.
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Signature verification failed.
    #[error("signature verification failed")]
    SignatureVerificationFailed,

    /// Invalid base64url encoding.
    #[error("invalid base64url encoding")]
    InvalidBase64Encoding,
}

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
