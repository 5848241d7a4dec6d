//! Error types for the gateway.

use thiserror::Error;

/// Errors raised while assembling or running the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A configuration value cannot be turned into a runtime setting.
    #[error("configuration error: {0}")]
    Config(String),

    /// A route's requirement does not parse or names a parameter the path
    /// does not capture.
    #[error("route {path} is misconfigured: {source}")]
    Route {
        /// Route path template.
        path: String,
        /// Underlying scope error.
        source: apidoc_capabilities::CapabilityError,
    },

    /// Signing key error.
    #[error("crypto error: {0}")]
    Crypto(#[from] apidoc_crypto::CryptoError),

    /// Store client error.
    #[error("store error: {0}")]
    Store(#[from] apidoc_store::StoreError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
