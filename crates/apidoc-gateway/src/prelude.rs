//! Prelude module - commonly used types for convenient import.
//!
//! Use `use apidoc_gateway::prelude::*;` to import all essential types.

pub use crate::{
    ApiError, AppState, AuthenticatedUser, GatewayError, GatewayResult, build_router, serve,
};
