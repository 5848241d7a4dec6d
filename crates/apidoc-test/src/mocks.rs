//! Collaborators that fail or hang, for outage tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use apidoc_store::{
    CredentialStore, DocumentStore, SearchHits, SearchQuery, StoreError, StoreResult, UserRecord,
};
use async_trait::async_trait;
use serde_json::Value;

fn outage() -> StoreError {
    StoreError::Unavailable("connection refused".to_string())
}

/// A credential store whose every call fails as unreachable.
#[derive(Debug, Default)]
pub struct FailingCredentialStore {
    calls: AtomicUsize,
}

impl FailingCredentialStore {
    /// Create a new failing store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> StoreResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(outage())
    }
}

#[async_trait]
impl CredentialStore for FailingCredentialStore {
    async fn lookup_user(&self, _username: &str) -> StoreResult<Option<UserRecord>> {
        self.fail()
    }

    async fn find_by_email(&self, _email: &str) -> StoreResult<Option<UserRecord>> {
        self.fail()
    }

    async fn create_user(&self, _record: &UserRecord) -> StoreResult<()> {
        self.fail()
    }

    async fn set_password(&self, _username: &str, _password_hash: &str) -> StoreResult<()> {
        self.fail()
    }
}

/// A credential store that sleeps before answering "no such user".
#[derive(Debug, Clone, Copy)]
pub struct StalledCredentialStore {
    delay: Duration,
}

impl StalledCredentialStore {
    /// Stall every call for `delay`.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl CredentialStore for StalledCredentialStore {
    async fn lookup_user(&self, _username: &str) -> StoreResult<Option<UserRecord>> {
        tokio::time::sleep(self.delay).await;
        Ok(None)
    }

    async fn find_by_email(&self, _email: &str) -> StoreResult<Option<UserRecord>> {
        tokio::time::sleep(self.delay).await;
        Ok(None)
    }

    async fn create_user(&self, _record: &UserRecord) -> StoreResult<()> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    async fn set_password(&self, _username: &str, _password_hash: &str) -> StoreResult<()> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// A document store whose every call fails as unreachable.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingDocumentStore;

#[async_trait]
impl DocumentStore for FailingDocumentStore {
    async fn create(&self, _index: &str, _id: Option<&str>, _doc: &Value) -> StoreResult<String> {
        Err(outage())
    }

    async fn get(&self, _index: &str, _id: &str) -> StoreResult<Value> {
        Err(StoreError::Timeout)
    }

    async fn update(&self, _index: &str, _id: &str, _partial: &Value) -> StoreResult<()> {
        Err(outage())
    }

    async fn delete(&self, _index: &str, _id: &str) -> StoreResult<()> {
        Err(outage())
    }

    async fn search_uri(&self, _index: &str, _query: &SearchQuery) -> StoreResult<SearchHits> {
        Err(outage())
    }

    async fn count(&self, _index: &str) -> StoreResult<u64> {
        Err(outage())
    }
}
