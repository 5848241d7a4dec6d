//! Application catalogue.

use apidoc_store::{SearchHits, SearchQuery};
use axum::Json;
use axum::extract::{Path, State};
use serde_json::Value;

use super::bounded;
use crate::response::ApiError;
use crate::state::AppState;

/// Index of application documents.
pub const APP_INDEX: &str = "app";
/// Index of documentation documents.
pub const DOC_INDEX: &str = "doc";

/// `GET /apps`: every registered application.
pub async fn list(State(state): State<AppState>) -> Result<Json<SearchHits>, ApiError> {
    let hits = bounded(state.store_timeout, state.documents.search_uri(APP_INDEX, &SearchQuery::all())).await?;
    Ok(Json(hits))
}

/// `GET /apps/{id}`: one application.
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let app = bounded(state.store_timeout, state.documents.get(APP_INDEX, &id)).await?;
    Ok(Json(app))
}

/// `GET /apps/{id}/docs`: the documentation published for an application.
pub async fn docs(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<SearchHits>, ApiError> {
    let query = SearchQuery::all().term("app", id);
    let hits = bounded(state.store_timeout, state.documents.search_uri(DOC_INDEX, &query)).await?;
    Ok(Json(hits))
}
