//! Metadata routes for UI pickers

use hyper::StatusCode;
use serde_json::json;

use crate::routes::response::{json_response, HttpResponse};
use crate::server::AppState;
use crate::types::Result;

/// `GET /api/v1/meta/subjects`
pub async fn subjects(state: &AppState) -> Result<HttpResponse> {
    let subjects = state.catalog.subjects().await?;
    Ok(json_response(StatusCode::OK, &json!({ "subjects": subjects })))
}

/// `GET /api/v1/meta/tags`
pub async fn tags(state: &AppState) -> Result<HttpResponse> {
    let tags = state.catalog.tags().await?;
    Ok(json_response(StatusCode::OK, &json!({ "tags": tags })))
}

/// `GET /api/v1/meta/options`: subjects with their chapters
pub async fn options(state: &AppState) -> Result<HttpResponse> {
    let index = state.catalog.subject_chapter_index().await?;
    Ok(json_response(StatusCode::OK, &index))
}
