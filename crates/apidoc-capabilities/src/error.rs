//! Capability-related error types.

use thiserror::Error;

/// Errors raised while parsing scopes, resolving requirements or issuing tokens.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// Scope text does not follow `action:resource[:p1[:p2]]`.
    #[error("malformed scope '{scope}': {reason}")]
    MalformedScope {
        /// The offending scope text.
        scope: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A route requirement names a placeholder the route does not bind.
    #[error("unresolved parameter '{placeholder}' in requirement '{requirement}'")]
    UnresolvedParameter {
        /// The placeholder name.
        placeholder: String,
        /// The requirement it belongs to.
        requirement: String,
    },

    /// A bound request parameter cannot appear in a capability.
    #[error("parameter '{placeholder}' has a value outside the scope alphabet")]
    InvalidParameterValue {
        /// The placeholder whose value was rejected.
        placeholder: String,
    },

    /// Crypto error.
    #[error("crypto error: {0}")]
    CryptoError(#[from] apidoc_crypto::CryptoError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

/// Result type for capability operations.
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Why an access token was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationFailure {
    /// Not a three-segment signed token, or its header/claims do not decode.
    #[error("malformed token: {reason}")]
    Malformed {
        /// What failed to decode.
        reason: String,
    },

    /// The signature does not match the header and claims.
    #[error("bad token signature")]
    BadSignature,

    /// The token is older than the max-age policy or past its expiry.
    #[error("token expired at {expired_at}")]
    Expired {
        /// Unix timestamp (seconds) at which the token stopped being valid.
        expired_at: i64,
    },

    /// The token names a different signing algorithm than the one configured.
    #[error("algorithm mismatch: expected {expected}, found {found}")]
    AlgorithmMismatch {
        /// The configured algorithm.
        expected: String,
        /// The algorithm named in the token header.
        found: String,
    },
}

impl VerificationFailure {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

/// Terminal rejection of a protected request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No `Authorization` header, or an empty one.
    #[error("Authorization header is missing or empty")]
    MissingAuthorization,

    /// The header is not `Bearer <token>` with a three-segment token.
    #[error(
        "Authorization header is malformed, make sure you included `Bearer` before your access token"
    )]
    MalformedAuthorization,

    /// Signature, algorithm or encoding failure.
    #[error("access token is invalid: {0}")]
    InvalidToken(VerificationFailure),

    /// The token is past its lifetime.
    #[error("Access token has expired, please login again")]
    ExpiredToken,

    /// Valid token, but no grant satisfies the route requirement.
    #[error("User does not have access to this resource/endpoint")]
    Forbidden {
        /// The resolved capability that was required.
        required: String,
    },

    /// The route requirement could not be resolved against the request.
    #[error("route authorization is misconfigured: {0}")]
    Misconfigured(String),
}

impl AuthError {
    /// Stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingAuthorization => "authorization_missing",
            Self::MalformedAuthorization => "authorization_malformed",
            Self::InvalidToken(_) => "invalid_token",
            Self::ExpiredToken => "access_token_expired",
            Self::Forbidden { .. } => "access_scope_mismatch",
            Self::Misconfigured(_) => "internal_error",
        }
    }
}
