//! User registration and activation.
//!
//! Registration stores a user with a random one-time code and no password.
//! Activation proves possession of the code and sets the password.

use std::sync::Arc;

use apidoc_capabilities::GrantSet;
use apidoc_crypto::generate_nonce;
use apidoc_store::{StoreError, UserRecord};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Serialize;
use serde_json::{Value, json};
use subtle::ConstantTimeEq;
use tracing::{error, info, warn};

use super::{bounded, json_object, optional_string, required_string};
use crate::auth::AuthenticatedUser;
use crate::response::{ApiError, ValidationIssue};
use crate::state::AppState;

/// Body of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationResponse {
    /// The new user's name.
    pub username: String,
    /// The new user's email.
    pub email: String,
    /// One-time code required by activation.
    pub code: String,
}

/// Body of a successful activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationResponse {
    /// Always `ok`.
    pub status: &'static str,
}

fn is_username(s: &str) -> bool {
    s.bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}

fn parse_acl(value: Option<&Value>, issues: &mut Vec<ValidationIssue>) -> GrantSet {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return GrantSet::none();
    };
    let scopes = match value {
        Value::String(s) if s == "superuser" => return GrantSet::Superuser,
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().ok_or(()))
            .collect::<Result<Vec<_>, ()>>(),
        _ => Err(()),
    };
    match scopes.map(GrantSet::try_from_scopes) {
        Ok(Ok(grants)) => grants,
        Ok(Err(e)) => {
            issues.push(ValidationIssue {
                keyword: "format",
                params: json!({ "property": "acl" }),
                message: e.to_string(),
            });
            GrantSet::none()
        },
        Err(()) => {
            issues.push(ValidationIssue::wrong_type(
                "acl",
                "\"superuser\" or an array of scopes",
            ));
            GrantSet::none()
        },
    }
}

/// `POST /users`: register a user and hand back their activation code.
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    body: Bytes,
) -> Result<(StatusCode, Json<RegistrationResponse>), ApiError> {
    let body = json_object(&body)?;
    let mut issues = Vec::new();
    let username = required_string(&body, "username", &mut issues);
    let email = required_string(&body, "email", &mut issues);
    let name = optional_string(&body, "name", &mut issues);
    let acl = parse_acl(body.get("acl"), &mut issues);

    if let Some(username) = &username
        && !is_username(username)
    {
        issues.push(ValidationIssue {
            keyword: "pattern",
            params: json!({ "property": "username", "pattern": "^[a-zA-Z0-9._-]+$" }),
            message: "username may only contain letters, digits, '.', '_' and '-'".to_owned(),
        });
    }
    if let Some(email) = &email
        && !email.contains('@')
    {
        issues.push(ValidationIssue {
            keyword: "format",
            params: json!({ "property": "email", "format": "email" }),
            message: "should match format \"email\"".to_owned(),
        });
    }
    let (Some(username), Some(email), true) = (username, email, issues.is_empty()) else {
        return Err(ApiError::validation(issues));
    };

    let code = generate_nonce(state.registration_code_length);
    let record = UserRecord {
        username: username.clone(),
        email: email.clone(),
        name,
        password_hash: None,
        acl,
        registration_code: Some(code.clone()),
    };

    match bounded(state.store_timeout, state.credentials.create_user(&record)).await {
        Ok(()) => {},
        Err(StoreError::Conflict { .. }) => {
            info!(%username, "Registration rejected: username taken");
            return Err(ApiError::conflict("User already exists"));
        },
        Err(e) => {
            warn!(%username, error = %e, "Registration failed");
            return Err(ApiError::unavailable());
        },
    }

    info!(%username, registered_by = %caller.username, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            username,
            email,
            code,
        }),
    ))
}

/// Which field identifies the account being activated.
enum Account {
    Username(String),
    Email(String),
}

/// `POST /users/activate`: set a password using the registration code.
pub async fn activate(State(state): State<AppState>, body: Bytes) -> Result<Json<ActivationResponse>, ApiError> {
    let body = json_object(&body)?;
    let mut issues = Vec::new();
    let username = optional_string(&body, "username", &mut issues);
    let email = optional_string(&body, "email", &mut issues);
    let password = required_string(&body, "password", &mut issues);
    let code = required_string(&body, "code", &mut issues);

    let account = match (username, email) {
        (Some(username), None) => Some(Account::Username(username)),
        (None, Some(email)) => Some(Account::Email(email)),
        (None, None) => {
            issues.push(ValidationIssue {
                keyword: "required",
                params: json!({ "missingProperty": ["username", "email"] }),
                message: "should have required parameter 'username' or 'email'".to_owned(),
            });
            None
        },
        (Some(_), Some(_)) => {
            issues.push(ValidationIssue {
                keyword: "exclusiveRequired",
                params: json!({ "exclusiveProperties": ["username", "email"] }),
                message: "should have only one of 'username' or 'email'".to_owned(),
            });
            None
        },
    };
    let (Some(account), Some(password), Some(code), true) =
        (account, password, code, issues.is_empty())
    else {
        return Err(ApiError::validation(issues));
    };

    let lookup = match &account {
        Account::Username(username) => {
            bounded(state.store_timeout, state.credentials.lookup_user(username)).await
        },
        Account::Email(email) => {
            bounded(state.store_timeout, state.credentials.find_by_email(email)).await
        },
    };
    let user = match lookup {
        Ok(Some(user)) => user,
        Ok(None) => return Err(ApiError::not_found("User not found")),
        Err(e) => {
            warn!(error = %e, "Credential lookup failed during activation");
            return Err(ApiError::unavailable());
        },
    };

    let code_matches = user
        .registration_code
        .as_deref()
        .is_some_and(|expected| bool::from(expected.as_bytes().ct_eq(code.as_bytes())));
    if !code_matches {
        info!(username = %user.username, "Activation rejected: registration code mismatch");
        return Err(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "invalid_registration_code",
            "Registration code does not match",
        ));
    }

    let hasher = Arc::clone(&state.passwords);
    let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| {
            error!(error = %e, "Password hashing task failed");
            ApiError::internal()
        })??;

    match bounded(state.store_timeout, state.credentials.set_password(&user.username, &hash)).await {
        Ok(()) => {
            info!(username = %user.username, "Account activated");
            Ok(Json(ActivationResponse { status: "ok" }))
        },
        Err(e @ (StoreError::NotFound { .. } | StoreError::Conflict { .. })) => Err(e.into()),
        Err(e) => {
            warn!(username = %user.username, error = %e, "Password update failed");
            Err(ApiError::unavailable())
        },
    }
}
