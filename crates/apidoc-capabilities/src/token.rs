//! Signed, time-bounded access tokens.
//!
//! Tokens use the compact three-segment form
//! `base64url(header).base64url(claims).base64url(signature)`, where the
//! signature is an HMAC over the first two segments joined by `.`.
//!
//! Verification checks, in order: shape and encoding, algorithm, lifetime,
//! signature. A token is dead once `exp` is reached or once it is older than
//! the configured max age, whichever comes first. An expired token reports
//! as expired even when its signature would also fail.

use std::time::Duration;

use apidoc_crypto::{
    DEFAULT_NONCE_LENGTH, SigningAlgorithm, SigningKey, decode_segment, encode_segment,
    generate_nonce,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CapabilityError, CapabilityResult, VerificationFailure};
use crate::grant::GrantSet;

const TOKEN_TYPE: &str = "JWT";

/// Signing and lifetime policy shared by issuance and verification.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    key: SigningKey,
    algorithm: SigningAlgorithm,
    max_age: Duration,
    nonce_length: usize,
    clock_tolerance: Duration,
}

impl TokenSettings {
    /// Create settings with the default nonce length and no clock tolerance.
    #[must_use]
    pub fn new(key: SigningKey, algorithm: SigningAlgorithm, max_age: Duration) -> Self {
        Self {
            key,
            algorithm,
            max_age,
            nonce_length: DEFAULT_NONCE_LENGTH,
            clock_tolerance: Duration::ZERO,
        }
    }

    /// Set the nonce length.
    #[must_use]
    pub fn with_nonce_length(mut self, length: usize) -> Self {
        self.nonce_length = length;
        self
    }

    /// Allow this much clock skew when checking lifetimes.
    #[must_use]
    pub fn with_clock_tolerance(mut self, tolerance: Duration) -> Self {
        self.clock_tolerance = tolerance;
        self
    }

    /// Configured algorithm.
    #[must_use]
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Configured maximum token age.
    #[must_use]
    pub fn max_age(&self) -> Duration {
        self.max_age
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    #[serde(default)]
    typ: Option<String>,
}

/// Claims carried in the token body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject identifier.
    pub user: String,
    /// Granted capabilities.
    #[serde(default)]
    pub scope: GrantSet,
    /// Random per-issuance nonce.
    pub nonce: String,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expires-at (unix seconds).
    pub exp: i64,
}

/// A freshly issued token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact encoded token.
    pub token: String,
    /// The claims that were signed.
    pub claims: AccessClaims,
}

/// The decoded content of a token that passed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    /// Subject identifier.
    pub subject: String,
    /// Granted capabilities.
    pub grants: GrantSet,
    /// Issuance nonce.
    pub nonce: String,
    /// Issued-at (unix seconds).
    pub issued_at: i64,
    /// Expires-at (unix seconds).
    pub expires_at: i64,
}

/// Issues and verifies access tokens.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    settings: TokenSettings,
}

impl TokenCodec {
    /// Create a codec.
    #[must_use]
    pub fn new(settings: TokenSettings) -> Self {
        Self { settings }
    }

    /// Configured algorithm.
    #[must_use]
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.settings.algorithm
    }

    /// Token lifetime in seconds.
    #[must_use]
    pub fn ttl_secs(&self) -> i64 {
        secs(self.settings.max_age)
    }

    /// Issue a token for `user` at the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the claims cannot be encoded or signed.
    pub fn issue(&self, user: &str, grants: GrantSet) -> CapabilityResult<IssuedToken> {
        self.issue_at(user, grants, chrono::Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the claims cannot be encoded or signed.
    pub fn issue_at(&self, user: &str, grants: GrantSet, now: i64) -> CapabilityResult<IssuedToken> {
        let claims = AccessClaims {
            user: user.to_string(),
            scope: grants,
            nonce: generate_nonce(self.settings.nonce_length),
            iat: now,
            exp: now.saturating_add(self.ttl_secs()),
        };
        let token = self.encode(&claims)?;

        debug!(user, exp = claims.exp, "Issued access token");
        Ok(IssuedToken { token, claims })
    }

    /// Verify a token at the current time.
    ///
    /// # Errors
    ///
    /// Returns the first [`VerificationFailure`] encountered.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, VerificationFailure> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns the first [`VerificationFailure`] encountered.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<VerifiedToken, VerificationFailure> {
        let mut segments = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(VerificationFailure::malformed("expected three segments"));
        };
        if header_b64.is_empty() || claims_b64.is_empty() || signature_b64.is_empty() {
            return Err(VerificationFailure::malformed("empty segment"));
        }

        let header: TokenHeader = decode_json(header_b64, "header")?;
        let claims: AccessClaims = decode_json(claims_b64, "claims")?;
        let signature = decode_segment(signature_b64)
            .map_err(|_| VerificationFailure::malformed("signature is not base64url"))?;

        let expected = self.settings.algorithm.as_str();
        if header.alg != expected {
            return Err(VerificationFailure::AlgorithmMismatch {
                expected: expected.to_string(),
                found: header.alg,
            });
        }

        let tolerance = secs(self.settings.clock_tolerance);
        let age_limit = claims.iat.saturating_add(self.ttl_secs());
        if now > age_limit.saturating_add(tolerance) || now >= claims.exp.saturating_add(tolerance)
        {
            return Err(VerificationFailure::Expired {
                expired_at: age_limit.min(claims.exp),
            });
        }

        let signing_input = format!("{header_b64}.{claims_b64}");
        self.settings
            .algorithm
            .verify(&self.settings.key, signing_input.as_bytes(), &signature)
            .map_err(|_| VerificationFailure::BadSignature)?;

        Ok(VerifiedToken {
            subject: claims.user,
            grants: claims.scope,
            nonce: claims.nonce,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }

    fn encode(&self, claims: &AccessClaims) -> CapabilityResult<String> {
        let header = TokenHeader {
            alg: self.settings.algorithm.as_str().to_string(),
            typ: Some(TOKEN_TYPE.to_string()),
        };
        let header_json = serde_json::to_vec(&header)
            .map_err(|e| CapabilityError::SerializationError(e.to_string()))?;
        let claims_json = serde_json::to_vec(claims)
            .map_err(|e| CapabilityError::SerializationError(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            encode_segment(&header_json),
            encode_segment(&claims_json)
        );
        let signature = self
            .settings
            .algorithm
            .sign(&self.settings.key, signing_input.as_bytes())?;

        Ok(format!("{signing_input}.{}", encode_segment(&signature)))
    }
}

fn decode_json<T: serde::de::DeserializeOwned>(
    segment: &str,
    what: &str,
) -> Result<T, VerificationFailure> {
    let bytes = decode_segment(segment)
        .map_err(|_| VerificationFailure::malformed(format!("{what} is not base64url")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| VerificationFailure::malformed(format!("{what} is not valid JSON: {e}")))
}

fn secs(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}
