//! User credential records and their store.

use std::sync::Arc;

use apidoc_capabilities::GrantSet;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::document::DocumentStore;
use crate::error::{StoreError, StoreResult};
use crate::query::SearchQuery;

/// Index holding user documents, keyed by username.
pub const USER_INDEX: &str = "user";

/// A stored user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserRecord {
    /// Login name; also the document id.
    #[serde(default)]
    pub username: String,
    /// Contact address, unique by convention.
    #[serde(default)]
    pub email: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// bcrypt hash. Absent until the account is activated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    /// Scopes granted to tokens issued for this user.
    #[serde(default)]
    pub acl: GrantSet,
    /// One-time code handed out at registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_code: Option<String>,
}

impl UserRecord {
    /// A record with no password, grants or code.
    #[must_use]
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    /// Decode a stored document, taking the username from the document id
    /// when the body lacks one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidResponse`] if the body is not a user document.
    pub fn from_document(id: &str, body: Value) -> StoreResult<Self> {
        let mut record: Self = serde_json::from_value(body)
            .map_err(|e| StoreError::InvalidResponse(format!("user '{id}': {e}")))?;
        if record.username.is_empty() {
            id.clone_into(&mut record.username);
        }
        Ok(record)
    }
}

/// Lookup and mutation of user records.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch a user by username. `Ok(None)` when no such user exists.
    async fn lookup_user(&self, username: &str) -> StoreResult<Option<UserRecord>>;

    /// Fetch a user by email address. `Ok(None)` when nobody has it.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    /// Store a new user. Fails with `Conflict` if the username is taken.
    async fn create_user(&self, record: &UserRecord) -> StoreResult<()>;

    /// Set a user's password hash. Fails with `NotFound` for unknown users.
    async fn set_password(&self, username: &str, password_hash: &str) -> StoreResult<()>;
}

/// [`CredentialStore`] over the `user` index of a [`DocumentStore`].
#[derive(Clone)]
pub struct DocumentCredentialStore {
    documents: Arc<dyn DocumentStore>,
}

impl DocumentCredentialStore {
    /// Wrap a document store.
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }
}

impl std::fmt::Debug for DocumentCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCredentialStore")
            .field("index", &USER_INDEX)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl CredentialStore for DocumentCredentialStore {
    async fn lookup_user(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        match self.documents.get(USER_INDEX, username).await {
            Ok(body) => UserRecord::from_document(username, body).map(Some),
            Err(StoreError::NotFound { .. }) => {
                debug!(username, "user not found");
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let query = SearchQuery::all().term("email", email);
        let hits = self.documents.search_uri(USER_INDEX, &query).await?;
        if hits.hits.len() > 1 {
            debug!(email, count = hits.hits.len(), "email matches several users, using the first");
        }
        hits.hits
            .into_iter()
            .next()
            .map(|hit| UserRecord::from_document(&hit.id, hit.source))
            .transpose()
    }

    async fn create_user(&self, record: &UserRecord) -> StoreResult<()> {
        let body = serde_json::to_value(record)
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        self.documents
            .create(USER_INDEX, Some(&record.username), &body)
            .await?;
        Ok(())
    }

    async fn set_password(&self, username: &str, password_hash: &str) -> StoreResult<()> {
        self.documents
            .update(USER_INDEX, username, &json!({ "password_hash": password_hash }))
            .await
    }
}
