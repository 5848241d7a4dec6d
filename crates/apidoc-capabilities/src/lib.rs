//! Apidoc Capabilities - Scope-based authorization for the documentation gateway.
//!
//! This crate provides:
//! - A fixed-arity scope grammar (`action:resource[:p1[:p2]]`)
//! - Route requirements whose parameter slots bind to request path parameters
//! - Grant sets carried inside signed, time-bounded access tokens
//! - Exact-arity, exact-value capability matching
//! - The per-request authorization decision used by the HTTP middleware
//!
//! # Security Model
//!
//! Every access token is:
//! - Signed with the gateway's single HMAC secret and configured algorithm
//! - Time-bounded by a server-side max-age policy
//! - Unique per issuance (random nonce)
//! - Never stored server-side
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use std::time::Duration;
//!
//! use apidoc_capabilities::{Authorizer, GrantSet, RouteRequirement, TokenCodec, TokenSettings};
//! use apidoc_crypto::{SigningAlgorithm, SigningKey};
//!
//! let settings = TokenSettings::new(
//!     SigningKey::from_secret("an-example-secret-of-reasonable-length").unwrap(),
//!     SigningAlgorithm::Hs512,
//!     Duration::from_secs(3600),
//! );
//! let authorizer = Authorizer::new(TokenCodec::new(settings));
//!
//! let grants = GrantSet::from_scopes(["read:app:app1"]);
//! let issued = authorizer.codec().issue("jimmy", grants).unwrap();
//! let header = format!("Bearer {}", issued.token);
//!
//! let requirement = RouteRequirement::parse("read:app:id").unwrap();
//! let params = HashMap::from([("id".to_string(), "app1".to_string())]);
//!
//! let principal = authorizer.authorize(Some(&header), &requirement, &params).unwrap();
//! assert_eq!(principal.subject, "jimmy");
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod authorizer;
mod error;
mod grant;
mod matcher;
mod requirement;
mod scope;
mod token;

pub use authorizer::{Authorizer, Principal, extract_bearer};
pub use error::{AuthError, CapabilityError, CapabilityResult, VerificationFailure};
pub use grant::GrantSet;
pub use matcher::{matches, satisfies};
pub use requirement::{PathParams, RouteRequirement};
pub use scope::{Action, Capability, MAX_PARAMS};
pub use token::{AccessClaims, IssuedToken, TokenCodec, TokenSettings, VerifiedToken};
