//! Apidoc Gateway - HTTP front end of the documentation service.
//!
//! This crate provides:
//! - Login, issuing access tokens scoped to a user's grants
//! - Per-route authorization middleware binding path parameters into the
//!   route's required capability
//! - Handlers for apps, docs, versions, branches and OpenAPI documents,
//!   all backed by the document store
//! - User registration and activation
//! - CORS, request correlation and graceful shutdown
//!
//! # Example
//!
//! ```rust,no_run
//! use apidoc_config::Config;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let resolved = Config::load(None)?;
//! apidoc_gateway::serve(&resolved.config).await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod auth;
pub mod config_bridge;
pub mod error;
pub mod handlers;
pub mod request_log;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use auth::{AuthenticatedUser, RouteGuard};
pub use error::{GatewayError, GatewayResult};
pub use response::{ApiError, ValidationIssue};
pub use routes::{RouteTable, build_router, route_table};
pub use server::{app_from_config, serve, serve_on};
pub use state::AppState;
