//! Question CRUD routes
//!
//! - `GET /api/v1/questions?subject=&type=&difficulty=`
//! - `GET /api/v1/questions/{id}`
//! - `POST /api/v1/questions`
//! - `PUT /api/v1/questions/{id}`
//! - `DELETE /api/v1/questions/{id}`

use bson::Document;
use bytes::Bytes;
use hyper::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::info;

use crate::db::schemas::Question;
use crate::db::QuestionRef;
use crate::quiz::filter::QuestionFilter;
use crate::routes::response::{json_response, parse_json_body, parse_query, HttpResponse};
use crate::server::AppState;
use crate::types::{QuizwayError, Result};

/// Query parameters for listing
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub subject: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub difficulty: Option<String>,
}

pub async fn list(state: &AppState, query: Option<&str>) -> Result<HttpResponse> {
    let params: ListParams = parse_query(query)?;
    let filter = QuestionFilter::for_listing(
        params.subject.as_deref(),
        params.kind.as_deref(),
        params.difficulty.as_deref(),
    )?;

    let questions = state.store.list_by_filter(&filter).await?;
    let data: Vec<JsonValue> = questions.iter().map(Question::to_json).collect();

    Ok(json_response(
        StatusCode::OK,
        &json!({ "count": data.len(), "data": data }),
    ))
}

/// Full record, answer key included
pub async fn get(state: &AppState, id: &str) -> Result<HttpResponse> {
    let id = QuestionRef::parse(id)?;
    let question = state
        .store
        .find_by_id(&id)
        .await?
        .ok_or_else(|| QuizwayError::NotFound(format!("question {id}")))?;

    Ok(json_response(StatusCode::OK, &question.to_json()))
}

pub async fn create(state: &AppState, body: &Bytes) -> Result<HttpResponse> {
    let raw: JsonValue = parse_json_body(body)?;
    let question = Question::from_client_json(raw)?;

    let key = state.store.insert(question).await?;
    info!(record_key = %key, "Question created");

    Ok(json_response(
        StatusCode::CREATED,
        &json!({ "id": key.to_hex(), "message": "Question created" }),
    ))
}

/// Partial update: body is a mapping of (dotted) field path to new value
pub async fn update(state: &AppState, id: &str, body: &Bytes) -> Result<HttpResponse> {
    let id = QuestionRef::parse(id)?;
    let raw: JsonValue = parse_json_body(body)?;
    if !raw.is_object() {
        return Err(QuizwayError::Validation(
            "update body must be a JSON object".to_string(),
        ));
    }
    let fields: Document = bson::to_document(&raw)?;

    state.store.update_fields(&id, fields).await?;
    info!(question = %id, "Question updated");

    Ok(json_response(
        StatusCode::OK,
        &json!({ "message": "Question updated" }),
    ))
}

pub async fn delete(state: &AppState, id: &str) -> Result<HttpResponse> {
    let id = QuestionRef::parse(id)?;
    state.store.delete(&id).await?;
    info!(question = %id, "Question deleted");

    Ok(json_response(
        StatusCode::OK,
        &json!({ "message": "Question deleted" }),
    ))
}
