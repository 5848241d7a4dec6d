//! In-memory document store for tests and local development.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::document::{DocumentStore, Hit, SearchHits};
use crate::error::{StoreError, StoreResult};
use crate::query::{QueryMode, SearchQuery};

type Index = BTreeMap<String, Value>;

/// A [`DocumentStore`] held in process memory.
///
/// Search matches a term when the document's field, rendered as a string,
/// equals the term value exactly.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    indices: RwLock<HashMap<String, Index>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in an Arc for sharing.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Seed a document, replacing any existing one.
    #[must_use]
    pub fn with_document(self, index: &str, id: &str, doc: Value) -> Self {
        if let Ok(mut indices) = self.indices.write() {
            indices
                .entry(index.to_owned())
                .or_default()
                .insert(id.to_owned(), doc);
        }
        self
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, HashMap<String, Index>>> {
        self.indices
            .read()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_owned()))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, HashMap<String, Index>>> {
        self.indices
            .write()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_owned()))
    }
}

fn not_found(index: &str, id: &str) -> StoreError {
    StoreError::NotFound {
        index: index.to_owned(),
        id: id.to_owned(),
    }
}

fn field_matches(doc: &Value, field: &str, expected: &str) -> bool {
    match doc.get(field) {
        Some(Value::String(s)) => s == expected,
        Some(Value::Null) | None => false,
        Some(other) => other.to_string() == expected,
    }
}

fn query_matches(doc: &Value, query: &SearchQuery) -> bool {
    let mut terms = query.terms().iter();
    match query.mode() {
        _ if query.terms().is_empty() => true,
        QueryMode::And => terms.all(|(f, v)| field_matches(doc, f, v)),
        QueryMode::Or => terms.any(|(f, v)| field_matches(doc, f, v)),
    }
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryStore {
    async fn create(&self, index: &str, id: Option<&str>, doc: &Value) -> StoreResult<String> {
        let mut indices = self.write()?;
        let docs = indices.entry(index.to_owned()).or_default();
        let id = id.map_or_else(|| uuid::Uuid::new_v4().simple().to_string(), str::to_owned);

        if docs.contains_key(&id) {
            return Err(StoreError::Conflict {
                index: index.to_owned(),
                id,
            });
        }
        docs.insert(id.clone(), doc.clone());
        Ok(id)
    }

    async fn get(&self, index: &str, id: &str) -> StoreResult<Value> {
        self.read()?
            .get(index)
            .and_then(|docs| docs.get(id))
            .cloned()
            .ok_or_else(|| not_found(index, id))
    }

    async fn update(&self, index: &str, id: &str, partial: &Value) -> StoreResult<()> {
        let mut indices = self.write()?;
        let doc = indices
            .get_mut(index)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| not_found(index, id))?;

        match (doc, partial) {
            (Value::Object(existing), Value::Object(fields)) => {
                for (key, value) in fields {
                    existing.insert(key.clone(), value.clone());
                }
                Ok(())
            },
            _ => Err(StoreError::InvalidResponse(
                "partial update requires JSON objects".to_owned(),
            )),
        }
    }

    async fn delete(&self, index: &str, id: &str) -> StoreResult<()> {
        self.write()?
            .get_mut(index)
            .and_then(|docs| docs.remove(id))
            .map(|_| ())
            .ok_or_else(|| not_found(index, id))
    }

    async fn search_uri(&self, index: &str, query: &SearchQuery) -> StoreResult<SearchHits> {
        let indices = self.read()?;
        let hits: Vec<Hit> = indices
            .get(index)
            .into_iter()
            .flat_map(BTreeMap::iter)
            .filter(|(_, doc)| query_matches(doc, query))
            .map(|(id, doc)| Hit {
                id: id.clone(),
                source: doc.clone(),
            })
            .collect();

        Ok(SearchHits {
            total: u64::try_from(hits.len()).unwrap_or(u64::MAX),
            hits,
        })
    }

    async fn count(&self, index: &str) -> StoreResult<u64> {
        let len = self.read()?.get(index).map_or(0, BTreeMap::len);
        Ok(u64::try_from(len).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn store() -> InMemoryStore {
        InMemoryStore::new()
            .with_document("docversion", "v1", json!({"app": "app1", "doc": "guide", "version": "1.0"}))
            .with_document("docversion", "v2", json!({"app": "app1", "doc": "guide", "version": "2.0"}))
            .with_document("docversion", "v3", json!({"app": "app2", "doc": "guide", "version": 3}))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = InMemoryStore::new();
        let id = store.create("app", Some("app1"), &json!({"name": "One"})).await.unwrap();
        assert_eq!(id, "app1");
        assert_eq!(store.get("app", "app1").await.unwrap(), json!({"name": "One"}));
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let store = InMemoryStore::new();
        let a = store.create("app", None, &json!({})).await.unwrap();
        let b = store.create("app", None, &json!({})).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.count("app").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let store = InMemoryStore::new();
        store.create("user", Some("jimmy"), &json!({})).await.unwrap();
        let err = store.create("user", Some("jimmy"), &json!({})).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let err = InMemoryStore::new().get("app", "nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = InMemoryStore::new().with_document("user", "jimmy", json!({"email": "j@x.io", "code": "abc"}));
        store
            .update("user", "jimmy", &json!({"password_hash": "h"}))
            .await
            .unwrap();
        assert_eq!(
            store.get("user", "jimmy").await.unwrap(),
            json!({"email": "j@x.io", "code": "abc", "password_hash": "h"})
        );

        let err = store.update("user", "nobody", &json!({})).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = store();
        store.delete("docversion", "v1").await.unwrap();
        assert_eq!(store.count("docversion").await.unwrap(), 2);
        assert!(store.delete("docversion", "v1").await.is_err());
    }

    #[tokio::test]
    async fn test_search_and() {
        let query = SearchQuery::new(QueryMode::And)
            .term("app", "app1")
            .term("doc", "guide");
        let hits = store().search_uri("docversion", &query).await.unwrap();
        assert_eq!(hits.total, 2);
        assert_eq!(hits.hits[0].id, "v1");
    }

    #[tokio::test]
    async fn test_search_or_and_non_string_fields() {
        let query = SearchQuery::new(QueryMode::Or)
            .term("version", "3")
            .term("version", "1.0");
        let hits = store().search_uri("docversion", &query).await.unwrap();
        assert_eq!(hits.total, 2);
    }

    #[tokio::test]
    async fn test_search_all_and_missing_index() {
        let store = store();
        assert_eq!(store.search_uri("docversion", &SearchQuery::all()).await.unwrap().total, 3);
        assert_eq!(store.search_uri("nothing", &SearchQuery::all()).await.unwrap().total, 0);
        assert_eq!(store.count("nothing").await.unwrap(), 0);
    }
}
