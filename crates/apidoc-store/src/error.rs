//! Store error types.

use thiserror::Error;

/// Errors raised by document and credential stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The document does not exist.
    #[error("document '{id}' not found in index '{index}'")]
    NotFound {
        /// Index searched.
        index: String,
        /// Document id.
        id: String,
    },

    /// A document with this id already exists.
    #[error("document '{id}' already exists in index '{index}'")]
    Conflict {
        /// Index written to.
        index: String,
        /// Document id.
        id: String,
    },

    /// The store did not answer in time.
    #[error("store request timed out")]
    Timeout,

    /// Transport failure or an unexpected status from the store.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with a body we could not interpret.
    #[error("invalid store response: {0}")]
    InvalidResponse(String),

    /// A document id does not have the `app.doc` shape.
    #[error("invalid document id '{0}'")]
    InvalidDocId(String),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl StoreError {
    /// Whether this is an outage (timeout or transport) rather than a
    /// statement about the data.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Unavailable(_) | Self::InvalidResponse(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Unavailable(e.to_string())
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
