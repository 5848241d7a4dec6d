//! Documentation, its versions, branches and OpenAPI documents.

use apidoc_store::{DocId, SearchHits};
use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::Value;

use super::apps::DOC_INDEX;
use super::bounded;
use crate::response::ApiError;
use crate::state::AppState;

/// Index of published versions.
pub const VERSION_INDEX: &str = "docversion";
/// Index of branches per version.
pub const BRANCH_INDEX: &str = "docbranch";
/// Index of OpenAPI documents, keyed `{app}.{doc}.{version}.{branch}`.
pub const OPENAPI_INDEX: &str = "openapi";

/// Branch served when the request names none.
pub const DEFAULT_BRANCH: &str = "master";

/// `GET /docs/{docId}`.
pub async fn get(State(state): State<AppState>, Path(doc_id): Path<String>) -> Result<Json<Value>, ApiError> {
    let doc = bounded(state.store_timeout, state.documents.get(DOC_INDEX, &doc_id)).await?;
    Ok(Json(doc))
}

/// `GET /docs/{docId}/versions`. `docId` is `doc` or `app.doc`.
pub async fn versions(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Json<SearchHits>, ApiError> {
    let query = DocId::parse(&doc_id)?.to_query();
    let hits = bounded(state.store_timeout, state.documents.search_uri(VERSION_INDEX, &query)).await?;
    Ok(Json(hits))
}

/// `GET /docs/{docId}/versions/{version}/branches`.
pub async fn branches(
    State(state): State<AppState>,
    Path((doc_id, version)): Path<(String, String)>,
) -> Result<Json<SearchHits>, ApiError> {
    let query = DocId::parse(&doc_id)?.to_query().term("version", version);
    let hits = bounded(state.store_timeout, state.documents.search_uri(BRANCH_INDEX, &query)).await?;
    Ok(Json(hits))
}

/// Query string of the OpenAPI route.
#[derive(Debug, Default, Deserialize)]
pub struct OpenApiQuery {
    /// Branch to serve; [`DEFAULT_BRANCH`] when absent or empty.
    pub branch: Option<String>,
}

/// `GET /docs/openapi/{appId}/{docId}/{version}[?branch=]`.
pub async fn openapi(
    State(state): State<AppState>,
    Path((app_id, doc_id, version)): Path<(String, String, String)>,
    Query(query): Query<OpenApiQuery>,
) -> Result<Json<Value>, ApiError> {
    let branch = query
        .branch
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| DEFAULT_BRANCH.to_owned());
    let id = openapi_id(&app_id, &doc_id, &version, &branch);
    let spec = bounded(state.store_timeout, state.documents.get(OPENAPI_INDEX, &id)).await?;
    Ok(Json(spec))
}

fn openapi_id(app_id: &str, doc_id: &str, version: &str, branch: &str) -> String {
    format!("{app_id}.{doc_id}.{version}.{branch}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_id() {
        assert_eq!(openapi_id("app1", "guide", "1.0", "master"), "app1.guide.1.0.master");
    }
}
