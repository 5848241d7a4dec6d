//! Per-request authorization.
//!
//! Turns an `Authorization` header, a route requirement and the request's
//! path parameters into either an authenticated [`Principal`] or a terminal
//! [`AuthError`].

use tracing::{debug, error, info, warn};

use crate::error::{AuthError, CapabilityError, VerificationFailure};
use crate::requirement::{PathParams, RouteRequirement};
use crate::token::TokenCodec;

/// The authenticated caller of a protected request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Subject identifier from the token.
    pub subject: String,
}

/// Guards protected routes with the gateway's token codec.
#[derive(Debug, Clone)]
pub struct Authorizer {
    codec: TokenCodec,
}

impl Authorizer {
    /// Create an authorizer around a token codec.
    #[must_use]
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    /// The codec used for issuing and verifying tokens.
    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Decide whether a request may proceed.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] describing why the request was rejected.
    pub fn authorize(
        &self,
        header: Option<&str>,
        requirement: &RouteRequirement,
        params: &PathParams,
    ) -> Result<Principal, AuthError> {
        self.authorize_at(header, requirement, params, chrono::Utc::now().timestamp())
    }

    /// [`Authorizer::authorize`] as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] describing why the request was rejected.
    pub fn authorize_at(
        &self,
        header: Option<&str>,
        requirement: &RouteRequirement,
        params: &PathParams,
        now: i64,
    ) -> Result<Principal, AuthError> {
        let header = header.map(str::trim).unwrap_or_default();
        if header.is_empty() {
            debug!(%requirement, "Rejected request without authorization");
            return Err(AuthError::MissingAuthorization);
        }

        let token = extract_bearer(header).ok_or_else(|| {
            debug!(%requirement, "Rejected malformed authorization header");
            AuthError::MalformedAuthorization
        })?;

        let verified = self.codec.verify_at(token, now).map_err(|failure| match failure {
            VerificationFailure::Expired { expired_at } => {
                debug!(expired_at, "Rejected expired access token");
                AuthError::ExpiredToken
            },
            other => {
                warn!(reason = %other, "Rejected invalid access token");
                AuthError::InvalidToken(other)
            },
        })?;

        let required = match requirement.resolve(params) {
            Ok(required) => required,
            // Superuser satisfies every requirement, even one no scope can name.
            Err(CapabilityError::InvalidParameterValue { .. }) if verified.grants.is_superuser() => {
                debug!(user = %verified.subject, %requirement, "Authorized as superuser");
                return Ok(Principal {
                    subject: verified.subject,
                });
            },
            Err(e @ CapabilityError::InvalidParameterValue { .. }) => {
                info!(user = %verified.subject, %requirement, error = %e, "Parameter cannot be granted");
                return Err(AuthError::Forbidden {
                    required: requirement.to_string(),
                });
            },
            Err(other) => {
                error!(%requirement, error = %other, "Route requirement does not resolve");
                return Err(AuthError::Misconfigured(other.to_string()));
            },
        };

        if !verified.grants.permits(&required) {
            info!(user = %verified.subject, %required, "Scope mismatch");
            return Err(AuthError::Forbidden {
                required: required.to_string(),
            });
        }

        debug!(user = %verified.subject, %required, "Authorized");
        Ok(Principal {
            subject: verified.subject,
        })
    }
}

/// Extract the token from a `Bearer <token>` header value.
///
/// The scheme is case-sensitive and must be followed by at least one space.
/// The token must have three non-empty `[A-Za-z0-9_-]` segments.
#[must_use]
pub fn extract_bearer(header: &str) -> Option<&str> {
    let rest = header.trim().strip_prefix("Bearer")?;
    if !rest.starts_with(' ') {
        return None;
    }
    let token = rest.trim_start_matches(' ');

    let segments: Vec<&str> = token.split('.').collect();
    let well_formed = segments.len() == 3
        && segments.iter().all(|s| {
            !s.is_empty()
                && s
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-'))
        });

    well_formed.then_some(token)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use apidoc_crypto::{SigningAlgorithm, SigningKey, encode_segment};

    use super::*;
    use crate::grant::GrantSet;
    use crate::token::TokenSettings;

    const NOW: i64 = 1_700_000_000;

    fn authorizer() -> Authorizer {
        Authorizer::new(TokenCodec::new(TokenSettings::new(
            SigningKey::from_secret("authorizer-test-secret-with-enough-bytes").unwrap(),
            SigningAlgorithm::Hs512,
            Duration::from_secs(600),
        )))
    }

    fn bearer(authorizer: &Authorizer, scopes: &[&str]) -> String {
        let issued = authorizer
            .codec()
            .issue_at("jimmy", GrantSet::from_scopes(scopes), NOW)
            .unwrap();
        format!("Bearer {}", issued.token)
    }

    fn params(pairs: &[(&str, &str)]) -> PathParams {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn req(text: &str) -> RouteRequirement {
        RouteRequirement::parse(text).unwrap()
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer a.b.c"), Some("a.b.c"));
        assert_eq!(extract_bearer("Bearer    a-1.b_2.c3"), Some("a-1.b_2.c3"));
        assert_eq!(extract_bearer("  Bearer a.b.c  "), Some("a.b.c"));

        assert_eq!(extract_bearer("bearer a.b.c"), None);
        assert_eq!(extract_bearer("Bearera.b.c"), None);
        assert_eq!(extract_bearer("Bearer a.b"), None);
        assert_eq!(extract_bearer("Bearer a..c"), None);
        assert_eq!(extract_bearer("Bearer a.b.c.d"), None);
        assert_eq!(extract_bearer("Bearer a.b=.c"), None);
        assert_eq!(extract_bearer("Basic dXNlcjpwYXNz"), None);
    }

    #[test]
    fn test_missing_header() {
        let auth = authorizer();
        for header in [None, Some(""), Some("   ")] {
            assert_eq!(
                auth.authorize_at(header, &req("read:apps"), &PathParams::new(), NOW),
                Err(AuthError::MissingAuthorization)
            );
        }
    }

    #[test]
    fn test_malformed_header() {
        let auth = authorizer();
        for header in ["Token abc", "Bearer", "Bearer abc", "Bearer a.b"] {
            assert_eq!(
                auth.authorize_at(Some(header), &req("read:apps"), &PathParams::new(), NOW),
                Err(AuthError::MalformedAuthorization)
            );
        }
    }

    #[test]
    fn test_authorized() {
        let auth = authorizer();
        let header = bearer(&auth, &["read:app:app1"]);
        let principal = auth
            .authorize_at(Some(&header), &req("read:app:id"), &params(&[("id", "app1")]), NOW)
            .unwrap();
        assert_eq!(principal.subject, "jimmy");
    }

    #[test]
    fn test_scope_mismatch() {
        let auth = authorizer();
        let header = bearer(&auth, &["read:app:app1"]);
        let err = auth
            .authorize_at(Some(&header), &req("read:app:id"), &params(&[("id", "app2")]), NOW)
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::Forbidden {
                required: "read:app:app2".to_string()
            }
        );
        assert_eq!(err.code(), "access_scope_mismatch");
    }

    #[test]
    fn test_superuser_passes_everything() {
        let auth = authorizer();
        let issued = auth.codec().issue_at("root", GrantSet::Superuser, NOW).unwrap();
        let header = format!("Bearer {}", issued.token);
        assert!(
            auth.authorize_at(
                Some(&header),
                &req("read:doc:appId:docId"),
                &params(&[("appId", "a"), ("docId", "b")]),
                NOW
            )
            .is_ok()
        );
    }

    #[test]
    fn test_expired_token() {
        let auth = authorizer();
        let header = bearer(&auth, &["read:apps"]);
        assert_eq!(
            auth.authorize_at(Some(&header), &req("read:apps"), &PathParams::new(), NOW + 601),
            Err(AuthError::ExpiredToken)
        );
    }

    #[test]
    fn test_invalid_token() {
        let auth = authorizer();
        let header = bearer(&auth, &["read:apps"]);
        let forged = format!("{}{}", &header[..header.rfind('.').unwrap() + 1], encode_segment(b"x"));
        assert_eq!(
            auth.authorize_at(Some(&forged), &req("read:apps"), &PathParams::new(), NOW),
            Err(AuthError::InvalidToken(VerificationFailure::BadSignature))
        );
    }

    #[test]
    fn test_unresolved_requirement_is_misconfiguration() {
        let auth = authorizer();
        let header = bearer(&auth, &["read:app:app1"]);
        let err = auth
            .authorize_at(Some(&header), &req("read:app:id"), &PathParams::new(), NOW)
            .unwrap_err();
        assert!(matches!(err, AuthError::Misconfigured(_)));
    }

    #[test]
    fn test_dotted_grant_never_matches_dotted_param() {
        let auth = authorizer();
        let header = bearer(&auth, &["read:doc:app1.guide"]);
        let err = auth
            .authorize_at(
                Some(&header),
                &req("read:doc:docId"),
                &params(&[("docId", "app1.guide")]),
                NOW,
            )
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden { .. }));
        assert_eq!(err.code(), "access_scope_mismatch");
    }

    #[test]
    fn test_superuser_passes_unnameable_param() {
        let auth = authorizer();
        let issued = auth.codec().issue_at("root", GrantSet::Superuser, NOW).unwrap();
        let header = format!("Bearer {}", issued.token);
        let principal = auth
            .authorize_at(
                Some(&header),
                &req("read:doc:docId"),
                &params(&[("docId", "app1.guide")]),
                NOW,
            )
            .unwrap();
        assert_eq!(principal.subject, "root");
    }

    #[test]
    fn test_expired_foreign_algorithm_is_invalid_not_expired() {
        let auth = authorizer();
        let foreign = TokenCodec::new(TokenSettings::new(
            SigningKey::from_secret("authorizer-test-secret-with-enough-bytes").unwrap(),
            SigningAlgorithm::Hs256,
            Duration::from_secs(600),
        ));
        let issued = foreign
            .issue_at("jimmy", GrantSet::from_scopes(["read:apps"]), NOW)
            .unwrap();
        let header = format!("Bearer {}", issued.token);
        let err = auth
            .authorize_at(Some(&header), &req("read:apps"), &PathParams::new(), NOW + 1_000_000)
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::InvalidToken(VerificationFailure::AlgorithmMismatch { .. })
        ));
        assert_eq!(err.code(), "invalid_token");
    }

    #[test]
    fn test_unrepresentable_param_is_forbidden() {
        let auth = authorizer();
        let header = bearer(&auth, &["read:app:app1"]);
        let err = auth
            .authorize_at(Some(&header), &req("read:app:id"), &params(&[("id", "app1:x")]), NOW)
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden { .. }));
    }
}
