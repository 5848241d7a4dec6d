//! Route table and router assembly.

use std::sync::Arc;

use apidoc_capabilities::{Authorizer, RouteRequirement};
use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware;
use axum::routing::{MethodRouter, get, post};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::debug;

use crate::auth::{RouteGuard, enforce};
use crate::error::{GatewayError, GatewayResult};
use crate::handlers::{apps, docs, health, login, users};
use crate::request_log::track_request;
use crate::state::AppState;

/// Builds a router in which every protected route is checked against its
/// path when registered.
#[derive(Debug)]
pub struct RouteTable {
    router: Router<AppState>,
    authorizer: Arc<Authorizer>,
    protected: Vec<(String, String)>,
}

impl RouteTable {
    /// Start an empty table guarded by `authorizer`.
    #[must_use]
    pub fn new(authorizer: Arc<Authorizer>) -> Self {
        Self {
            router: Router::new(),
            authorizer,
            protected: Vec::new(),
        }
    }

    /// Add a route anyone may call.
    #[must_use]
    pub fn public(mut self, path: &str, route: MethodRouter<AppState>) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Add a route that requires `requirement`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Route`] if the requirement does not parse or
    /// names a placeholder that `path` does not capture.
    pub fn protected(
        mut self,
        path: &str,
        requirement: &str,
        route: MethodRouter<AppState>,
    ) -> GatewayResult<Self> {
        let route_error = |source| GatewayError::Route {
            path: path.to_owned(),
            source,
        };
        let requirement = RouteRequirement::parse(requirement).map_err(route_error)?;
        requirement.check_route(path).map_err(route_error)?;

        debug!(path, %requirement, "Registered protected route");
        self.protected.push((path.to_owned(), requirement.to_string()));
        let guard = RouteGuard::new(Arc::clone(&self.authorizer), requirement);
        self.router = self
            .router
            .route(path, route.route_layer(middleware::from_fn_with_state(guard, enforce)));
        Ok(self)
    }

    /// `(path, requirement)` for every protected route, in registration order.
    #[must_use]
    pub fn protected_routes(&self) -> &[(String, String)] {
        &self.protected
    }

    /// The assembled router, still awaiting state.
    #[must_use]
    pub fn into_router(self) -> Router<AppState> {
        self.router
    }
}

/// The gateway's routes.
///
/// # Errors
///
/// Returns [`GatewayError::Route`] if any route requirement is inconsistent
/// with its path.
pub fn route_table(authorizer: Arc<Authorizer>) -> GatewayResult<RouteTable> {
    RouteTable::new(authorizer)
        .public("/health", get(health::health))
        .public("/login", post(login::login))
        .public("/users/activate", post(users::activate))
        .protected("/apps", "read:apps", get(apps::list))?
        .protected("/apps/{id}", "read:app:id", get(apps::get))?
        .protected("/apps/{id}/docs", "read:app.docs:id", get(apps::docs))?
        .protected("/docs/{docId}", "read:doc:docId", get(docs::get))?
        .protected(
            "/docs/{docId}/versions",
            "read:doc.versions:docId",
            get(docs::versions),
        )?
        .protected(
            "/docs/{docId}/versions/{version}/branches",
            "read:doc.branches:docId",
            get(docs::branches),
        )?
        .protected(
            "/docs/openapi/{appId}/{docId}/{version}",
            "read:doc:appId:docId",
            get(docs::openapi),
        )?
        .protected("/users", "write:users", post(users::create))
}

/// CORS for the configured client origin. `*` allows any origin.
///
/// # Errors
///
/// Returns [`GatewayError::Config`] if `origin` is not a valid header value.
pub fn cors_layer(origin: &str) -> GatewayResult<CorsLayer> {
    let allow_origin = if origin.trim() == "*" {
        AllowOrigin::any()
    } else {
        let value = HeaderValue::from_str(origin.trim())
            .map_err(|e| GatewayError::Config(format!("invalid client origin '{origin}': {e}")))?;
        AllowOrigin::exact(value)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]))
}

/// The complete application: routes, CORS, request logging and state.
///
/// # Errors
///
/// Returns a [`GatewayError`] if a route is misconfigured or the origin is
/// invalid.
pub fn build_router(state: AppState, client_origin: &str) -> GatewayResult<Router> {
    let table = route_table(Arc::clone(&state.authorizer))?;
    Ok(table
        .into_router()
        .layer(cors_layer(client_origin)?)
        .layer(middleware::from_fn(track_request))
        .with_state(state))
}
