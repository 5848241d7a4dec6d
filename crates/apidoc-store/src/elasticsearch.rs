//! Elasticsearch-backed document store.
//!
//! Talks to the REST API directly:
//! - `GET /{index}/_doc/{id}` fetches a document and unwraps `_source`
//! - `PUT /{index}/_create/{id}` or `POST /{index}/_doc` creates one
//! - `POST /{index}/_update/{id}` merges a partial document
//! - `DELETE /{index}/_doc/{id}` removes one
//! - `GET /{index}/_search?q=...` runs a Lucene URI search
//! - `GET /{index}/_count` counts documents
//!
//! A 404 maps to [`StoreError::NotFound`], a 409 to [`StoreError::Conflict`],
//! and every other non-success status or transport failure to an outage.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::document::{DocumentStore, Hit, SearchHits};
use crate::error::{StoreError, StoreResult};
use crate::query::SearchQuery;

/// Connection settings for an Elasticsearch cluster.
#[derive(Clone)]
pub struct ElasticsearchConfig {
    /// `host:port`, optionally followed by a path prefix.
    pub url: String,
    /// Use https instead of http.
    pub secure: bool,
    /// Basic-auth user.
    pub key: Option<String>,
    /// Basic-auth password.
    pub secret: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: "localhost:9200".to_owned(),
            secure: false,
            key: None,
            secret: None,
            timeout: Duration::from_secs(10),
        }
    }
}

impl std::fmt::Debug for ElasticsearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticsearchConfig")
            .field("url", &self.url)
            .field("secure", &self.secure)
            .field("key", &self.key)
            .field("has_secret", &self.secret.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// A [`DocumentStore`] over the Elasticsearch REST API.
#[derive(Debug, Clone)]
pub struct ElasticsearchStore {
    base: Url,
    key: Option<String>,
    secret: Option<String>,
    client: Client,
}

impl ElasticsearchStore {
    /// Build a store client. No request is made until the first operation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the URL does not parse or the
    /// HTTP client cannot be constructed.
    pub fn new(config: ElasticsearchConfig) -> StoreResult<Self> {
        let scheme = if config.secure { "https" } else { "http" };
        let base = Url::parse(&format!("{scheme}://{}", config.url))
            .map_err(|e| StoreError::Unavailable(format!("invalid store url '{}': {e}", config.url)))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::Unavailable(format!(
                "invalid store url '{}'",
                config.url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base,
            key: config.key,
            secret: config.secret,
            client,
        })
    }

    /// The cluster base URL, without credentials.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> StoreResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::Unavailable("store url cannot carry a path".to_owned()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.key {
            Some(key) => builder.basic_auth(key, self.secret.as_deref()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, index: &str, id: &str) -> StoreResult<Response> {
        let response = builder.send().await.map_err(|e| {
            warn!(index, id, error = %e, "store request failed");
            StoreError::from(e)
        })?;

        let status = response.status();
        debug!(index, id, status = status.as_u16(), "store response");
        match status {
            s if s.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound {
                index: index.to_owned(),
                id: id.to_owned(),
            }),
            StatusCode::CONFLICT => Err(StoreError::Conflict {
                index: index.to_owned(),
                id: id.to_owned(),
            }),
            s => {
                warn!(index, id, status = s.as_u16(), "unexpected store status");
                Err(StoreError::Unavailable(format!(
                    "HTTP {} - {}",
                    s.as_u16(),
                    s.canonical_reason().unwrap_or("Unknown")
                )))
            },
        }
    }
}

#[derive(Deserialize)]
struct GetResponse {
    #[serde(rename = "_source")]
    source: Value,
}

#[derive(Deserialize)]
struct WriteResponse {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: SearchBody,
}

#[derive(Deserialize)]
struct SearchBody {
    total: Total,
    #[serde(default)]
    hits: Vec<Hit>,
}

/// `hits.total` is a bare number before 7.x and an object after.
#[derive(Deserialize)]
#[serde(untagged)]
enum Total {
    Count(u64),
    Object { value: u64 },
}

impl Total {
    fn value(&self) -> u64 {
        match self {
            Self::Count(n) | Self::Object { value: n } => *n,
        }
    }
}

fn parse_search(body: Value) -> StoreResult<SearchHits> {
    let parsed: SearchResponse =
        serde_json::from_value(body).map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
    Ok(SearchHits {
        total: parsed.hits.total.value(),
        hits: parsed.hits.hits,
    })
}

#[async_trait::async_trait]
impl DocumentStore for ElasticsearchStore {
    async fn create(&self, index: &str, id: Option<&str>, doc: &Value) -> StoreResult<String> {
        let builder = match id {
            Some(id) => self.request(Method::PUT, self.endpoint(&[index, "_create", id])?),
            None => self.request(Method::POST, self.endpoint(&[index, "_doc"])?),
        };
        let response = self
            .send(builder.json(doc), index, id.unwrap_or_default())
            .await?;
        let written: WriteResponse = response.json().await?;
        Ok(written.id)
    }

    async fn get(&self, index: &str, id: &str) -> StoreResult<Value> {
        let url = self.endpoint(&[index, "_doc", id])?;
        let response = self.send(self.request(Method::GET, url), index, id).await?;
        let body: GetResponse = response.json().await?;
        Ok(body.source)
    }

    async fn update(&self, index: &str, id: &str, partial: &Value) -> StoreResult<()> {
        let url = self.endpoint(&[index, "_update", id])?;
        let builder = self.request(Method::POST, url).json(&json!({ "doc": partial }));
        self.send(builder, index, id).await?;
        Ok(())
    }

    async fn delete(&self, index: &str, id: &str) -> StoreResult<()> {
        let url = self.endpoint(&[index, "_doc", id])?;
        self.send(self.request(Method::DELETE, url), index, id).await?;
        Ok(())
    }

    async fn search_uri(&self, index: &str, query: &SearchQuery) -> StoreResult<SearchHits> {
        let mut url = self.endpoint(&[index, "_search"])?;
        if let Some(q) = query.render() {
            url.query_pairs_mut().append_pair("q", &q);
        }
        let response = self.send(self.request(Method::GET, url), index, "_search").await?;
        parse_search(response.json().await?)
    }

    async fn count(&self, index: &str) -> StoreResult<u64> {
        let url = self.endpoint(&[index, "_count"])?;
        let response = self.send(self.request(Method::GET, url), index, "_count").await?;
        let body: CountResponse = response.json().await?;
        Ok(body.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(url: &str, secure: bool) -> ElasticsearchStore {
        ElasticsearchStore::new(ElasticsearchConfig {
            url: url.to_owned(),
            secure,
            ..ElasticsearchConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_base_url_scheme() {
        assert_eq!(store("localhost:9200", false).base_url().as_str(), "http://localhost:9200/");
        assert_eq!(store("es.example.com", true).base_url().as_str(), "https://es.example.com/");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let es = store("localhost:9200", false);
        let url = es.endpoint(&["doc", "_doc", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9200/doc/_doc/a%20b%2Fc");
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let es = store("proxy.internal/es", true);
        let url = es.endpoint(&["app", "_count"]).unwrap();
        assert_eq!(url.as_str(), "https://proxy.internal/es/app/_count");
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = ElasticsearchStore::new(ElasticsearchConfig {
            url: "bad host:notaport".to_owned(),
            ..ElasticsearchConfig::default()
        });
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = ElasticsearchConfig {
            key: Some("elastic".to_owned()),
            secret: Some("hunter2".to_owned()),
            ..ElasticsearchConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("elastic"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_parse_search_total_forms() {
        let legacy = json!({"hits": {"total": 2, "hits": [
            {"_id": "a", "_source": {"n": 1}},
            {"_id": "b", "_source": {"n": 2}}
        ]}});
        let parsed = parse_search(legacy).unwrap();
        assert_eq!(parsed.total, 2);
        assert_eq!(parsed.hits[1].id, "b");

        let modern = json!({"hits": {"total": {"value": 7, "relation": "eq"}, "hits": []}});
        assert_eq!(parse_search(modern).unwrap().total, 7);

        assert!(matches!(
            parse_search(json!({"took": 1})),
            Err(StoreError::InvalidResponse(_))
        ));
    }

    async fn stub_cluster() -> ElasticsearchStore {
        use axum::http::StatusCode as Status;
        use axum::routing::{get, put};

        let app = axum::Router::new()
            .route("/doc/_doc/{id}", get(|| async {
                axum::Json(json!({"_id": "guide", "found": true, "_source": {"title": "User Guide"}}))
            }))
            .route("/app/_doc/{id}", get(|| async { Status::NOT_FOUND }))
            .route("/app/_create/{id}", put(|| async { Status::CONFLICT }))
            .route("/app/_count", get(|| async { Status::INTERNAL_SERVER_ERROR }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        store(&addr.to_string(), false)
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let es = stub_cluster().await;

        let doc = es.get("doc", "guide").await.unwrap();
        assert_eq!(doc["title"], "User Guide");

        let err = es.get("app", "missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref index, ref id } if index == "app" && id == "missing"));

        let err = es.create("app", Some("app1"), &json!({"name": "App"})).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { ref id, .. } if id == "app1"));

        let err = es.count("app").await.unwrap_err();
        assert!(err.is_unavailable());
        assert!(err.to_string().contains("HTTP 500"));
    }

    #[tokio::test]
    async fn test_unreachable_cluster_is_unavailable() {
        let es = ElasticsearchStore::new(ElasticsearchConfig {
            url: "127.0.0.1:1".to_owned(),
            timeout: Duration::from_secs(2),
            ..ElasticsearchConfig::default()
        })
        .unwrap();
        let err = es.get("app", "app1").await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
