//! Shared state handed to every handler.

use std::sync::Arc;
use std::time::Duration;

use apidoc_capabilities::Authorizer;
use apidoc_config::Config;
use apidoc_store::{
    BcryptVerifier, CredentialStore, DocumentCredentialStore, DocumentStore, ElasticsearchStore,
    PasswordVerifier,
};

use crate::config_bridge;
use crate::error::GatewayResult;

/// Registration code length used when none is configured.
pub const DEFAULT_REGISTRATION_CODE_LENGTH: usize = 21;

/// Immutable application state. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Verifies tokens and decides route access.
    pub authorizer: Arc<Authorizer>,
    /// Document indices (apps, docs, versions, branches, OpenAPI).
    pub documents: Arc<dyn DocumentStore>,
    /// User records.
    pub credentials: Arc<dyn CredentialStore>,
    /// Password hashing.
    pub passwords: Arc<dyn PasswordVerifier>,
    /// Upper bound on every store call made by a handler.
    pub store_timeout: Duration,
    /// Length of generated registration codes.
    pub registration_code_length: usize,
}

impl AppState {
    /// State with user records kept in the `user` index of `documents` and
    /// bcrypt at the default cost.
    #[must_use]
    pub fn new(authorizer: Authorizer, documents: Arc<dyn DocumentStore>) -> Self {
        let credentials = Arc::new(DocumentCredentialStore::new(Arc::clone(&documents)));
        Self {
            authorizer: Arc::new(authorizer),
            documents,
            credentials,
            passwords: Arc::new(BcryptVerifier::default()),
            store_timeout: Duration::from_secs(10),
            registration_code_length: DEFAULT_REGISTRATION_CODE_LENGTH,
        }
    }

    /// Build state from configuration, talking to Elasticsearch.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::GatewayError`] if the auth section does not yield
    /// a usable key or the store client cannot be built.
    pub fn from_config(config: &Config) -> GatewayResult<Self> {
        let authorizer = config_bridge::authorizer(&config.auth)?;
        let store = ElasticsearchStore::new(config_bridge::elasticsearch_config(&config.store))?;

        Ok(Self::new(authorizer, Arc::new(store))
            .with_store_timeout(Duration::from_secs(config.store.timeout_secs))
            .with_registration_code_length(config.users.registration_code_length))
    }

    /// Use a different credential store.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Use a different password verifier.
    #[must_use]
    pub fn with_passwords(mut self, passwords: Arc<dyn PasswordVerifier>) -> Self {
        self.passwords = passwords;
        self
    }

    /// Bound credential lookups by `timeout`.
    #[must_use]
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Generate registration codes of `length` characters.
    #[must_use]
    pub fn with_registration_code_length(mut self, length: usize) -> Self {
        self.registration_code_length = length;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("algorithm", &self.authorizer.codec().algorithm())
            .field("store_timeout", &self.store_timeout)
            .field("registration_code_length", &self.registration_code_length)
            .finish_non_exhaustive()
    }
}
