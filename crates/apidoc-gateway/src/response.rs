//! JSON error responses.
//!
//! Every failure leaves the gateway as `{error, message}`, or as
//! `{errors: [...]}` for request validation. Upstream detail is logged,
//! never sent to the client.

use apidoc_capabilities::AuthError;
use apidoc_store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{error, warn};

/// One request validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// The rule that failed (`required`, `type`, `exclusiveRequired`, ...).
    pub keyword: &'static str,
    /// Rule-specific details, such as the missing property.
    pub params: Value,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    /// A required property is missing or empty.
    #[must_use]
    pub fn required(property: &str) -> Self {
        Self {
            keyword: "required",
            params: json!({ "missingProperty": property }),
            message: format!("should have required property '{property}'"),
        }
    }

    /// A property has the wrong JSON type.
    #[must_use]
    pub fn wrong_type(property: &str, expected: &'static str) -> Self {
        Self {
            keyword: "type",
            params: json!({ "property": property, "type": expected }),
            message: format!("property '{property}' should be {expected}"),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ErrorBody {
    Message { error: &'static str, message: String },
    Validation { errors: Vec<ValidationIssue> },
}

/// An error response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    /// An error with a status, a stable code and a message.
    #[must_use]
    pub fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody::Message {
                error,
                message: message.into(),
            },
        }
    }

    /// `400` with the given code.
    #[must_use]
    pub fn bad_request(error: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error, message)
    }

    /// `422` listing every validation failure.
    #[must_use]
    pub fn validation(errors: Vec<ValidationIssue>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: ErrorBody::Validation { errors },
        }
    }

    /// `401` for a failed login. Never says which half was wrong.
    #[must_use]
    pub fn invalid_credentials() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Invalid username and password",
        )
    }

    /// `404`.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    /// `409`.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "conflict", message)
    }

    /// `503`. Callers log the cause.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "service_unavailable",
            "Service temporarily unavailable",
        )
    }

    /// `500`. Callers log the cause.
    #[must_use]
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal server error",
        )
    }

    /// Response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = match &err {
            AuthError::MissingAuthorization
            | AuthError::MalformedAuthorization
            | AuthError::ExpiredToken
            | AuthError::Forbidden { .. } => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken(_) => StatusCode::FORBIDDEN,
            AuthError::Misconfigured(_) => return Self::internal(),
        };
        let message = match &err {
            AuthError::InvalidToken(_) => "Access token is invalid".to_owned(),
            other => other.to_string(),
        };
        Self::new(status, err.code(), message)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::not_found("Resource not found"),
            StoreError::Conflict { .. } => Self::conflict("Resource already exists"),
            StoreError::InvalidDocId(_) => {
                Self::bad_request("bad_request_param", "docId does not match expected pattern")
            },
            StoreError::Hashing(reason) => {
                error!(%reason, "Password hashing failed");
                Self::internal()
            },
            other => {
                warn!(error = %other, "Document store unavailable");
                Self::unavailable()
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
