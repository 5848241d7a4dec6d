//! `POST /login`: exchange a username and password for an access token.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::Serialize;
use tracing::{error, info, warn};

use super::{bounded, json_object, required_string};
use crate::response::ApiError;
use crate::state::AppState;

/// Body of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponse {
    /// Always `ok`.
    pub status: &'static str,
    /// Signed access token.
    pub token: String,
    /// Token lifetime in seconds.
    pub ttl: i64,
}

/// Verify credentials and issue a token scoped to the user's grants.
///
/// Unknown users, users without a password hash and wrong passwords all
/// get the same `401`.
pub async fn login(State(state): State<AppState>, body: Bytes) -> Result<Json<LoginResponse>, ApiError> {
    let body = json_object(&body)?;
    let mut issues = Vec::new();
    let username = required_string(&body, "username", &mut issues);
    let password = required_string(&body, "password", &mut issues);
    let (Some(username), Some(password)) = (username, password) else {
        return Err(ApiError::validation(issues));
    };

    let user = match bounded(state.store_timeout, state.credentials.lookup_user(&username)).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            info!(%username, "Login rejected: unknown user");
            return Err(ApiError::invalid_credentials());
        },
        Err(e) => {
            warn!(%username, error = %e, "Credential lookup failed during login");
            return Err(ApiError::unavailable());
        },
    };

    let Some(hash) = user.password_hash.clone() else {
        info!(%username, "Login rejected: account has no password");
        return Err(ApiError::invalid_credentials());
    };

    let verifier = Arc::clone(&state.passwords);
    let verified = tokio::task::spawn_blocking(move || verifier.verify(&password, &hash))
        .await
        .map_err(|e| {
            error!(error = %e, "Password verification task failed");
            ApiError::internal()
        })?;
    if !verified {
        info!(%username, "Login rejected: wrong password");
        return Err(ApiError::invalid_credentials());
    }

    let codec = state.authorizer.codec();
    let issued = codec.issue(&user.username, user.acl).map_err(|e| {
        error!(%username, error = %e, "Token issuance failed");
        ApiError::internal()
    })?;

    info!(%username, "Login succeeded");
    Ok(Json(LoginResponse {
        status: "ok",
        token: issued.token,
        ttl: codec.ttl_secs(),
    }))
}
