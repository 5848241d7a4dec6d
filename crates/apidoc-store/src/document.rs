//! Document store abstraction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreResult;
use crate::query::SearchQuery;

/// One search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Document body.
    #[serde(rename = "_source")]
    pub source: Value,
}

/// Results of a URI search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHits {
    /// Total number of matching documents.
    pub total: u64,
    /// The returned documents.
    pub hits: Vec<Hit>,
}

/// A JSON document store organised in indices.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document. With `id: None` the store assigns one.
    ///
    /// Returns the document id. Fails with `Conflict` if `id` is taken.
    async fn create(&self, index: &str, id: Option<&str>, doc: &Value) -> StoreResult<String>;

    /// Fetch a document body. Fails with `NotFound` if absent.
    async fn get(&self, index: &str, id: &str) -> StoreResult<Value>;

    /// Merge `partial` into an existing document's top-level fields.
    async fn update(&self, index: &str, id: &str, partial: &Value) -> StoreResult<()>;

    /// Delete a document. Fails with `NotFound` if absent.
    async fn delete(&self, index: &str, id: &str) -> StoreResult<()>;

    /// Run a URI search.
    async fn search_uri(&self, index: &str, query: &SearchQuery) -> StoreResult<SearchHits>;

    /// Number of documents in an index.
    async fn count(&self, index: &str) -> StoreResult<u64>;
}
