//! Authorization middleware for protected routes.
//!
//! Each protected route carries its own [`RouteGuard`]. The guard reads the
//! `Authorization` header, binds the route's path parameters into its
//! requirement and asks the [`Authorizer`] for a decision. On success the
//! handler sees an [`AuthenticatedUser`] extension; on failure the handler
//! never runs.

use std::collections::HashMap;
use std::sync::Arc;

use apidoc_capabilities::{Authorizer, PathParams, RouteRequirement};
use axum::extract::rejection::RawPathParamsRejection;
use axum::extract::{RawPathParams, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::response::ApiError;

/// The subject of a token that passed the route's requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Username carried in the token.
    pub username: String,
}

/// The authorizer and requirement bound to one route.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    authorizer: Arc<Authorizer>,
    requirement: Arc<RouteRequirement>,
}

impl RouteGuard {
    /// Guard a route with `requirement`.
    #[must_use]
    pub fn new(authorizer: Arc<Authorizer>, requirement: RouteRequirement) -> Self {
        Self {
            authorizer,
            requirement: Arc::new(requirement),
        }
    }

    /// The requirement this guard enforces.
    #[must_use]
    pub fn requirement(&self) -> &RouteRequirement {
        &self.requirement
    }
}

/// Middleware enforcing a [`RouteGuard`]. Install with
/// `axum::middleware::from_fn_with_state` as a route layer.
pub async fn enforce(
    State(guard): State<RouteGuard>,
    raw_params: Result<RawPathParams, RawPathParamsRejection>,
    mut request: Request,
    next: Next,
) -> Response {
    let params: PathParams = match raw_params {
        Ok(raw) => raw
            .iter()
            .map(|(name, value)| (name.to_owned(), value.to_owned()))
            .collect(),
        Err(RawPathParamsRejection::InvalidUtf8InPathParam(_)) => {
            return ApiError::bad_request("bad_request_param", "Path parameter is not valid UTF-8")
                .into_response();
        },
        Err(_) => HashMap::new(),
    };

    let header = match request.headers().get(AUTHORIZATION).map(|v| v.to_str()) {
        Some(Ok(value)) => Some(value),
        Some(Err(_)) => {
            warn!(requirement = %guard.requirement, "Authorization header is not visible ASCII");
            return ApiError::from(apidoc_capabilities::AuthError::MalformedAuthorization)
                .into_response();
        },
        None => None,
    };

    match guard.authorizer.authorize(header, &guard.requirement, &params) {
        Ok(principal) => {
            request.extensions_mut().insert(AuthenticatedUser {
                username: principal.subject,
            });
            next.run(request).await
        },
        Err(err) => ApiError::from(err).into_response(),
    }
}
