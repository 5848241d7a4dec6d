//! Prelude module - commonly used types for convenient import.
//!
//! Use `use apidoc_capabilities::prelude::*;` to import all essential types.

// Errors
pub use crate::{AuthError, CapabilityError, CapabilityResult, VerificationFailure};

// Scope grammar
pub use crate::{Action, Capability, GrantSet, PathParams, RouteRequirement};

// Tokens
pub use crate::{AccessClaims, IssuedToken, TokenCodec, TokenSettings, VerifiedToken};

// Decisions
pub use crate::{Authorizer, Principal, matches};
