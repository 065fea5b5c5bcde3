//! Quiz routes: generation, answer checking, explanations

use bytes::Bytes;
use hyper::StatusCode;
use serde_json::{json, Value as JsonValue};

use crate::db::schemas::Question;
use crate::quiz::{GenerateQuizRequest, ValidateAnswerRequest};
use crate::routes::response::{json_response, parse_json_body, HttpResponse};
use crate::server::AppState;
use crate::types::{QuizwayError, Result};

/// `POST /api/v1/quiz/generate`
pub async fn generate(state: &AppState, body: &Bytes) -> Result<HttpResponse> {
    let request: GenerateQuizRequest = parse_json_body(body)?;
    let quiz = state.generator.generate(&request).await?;
    let quiz: Vec<JsonValue> = quiz.iter().map(Question::to_json).collect();

    Ok(json_response(
        StatusCode::OK,
        &json!({ "count": quiz.len(), "quiz": quiz }),
    ))
}

/// `POST /api/v1/quiz/validate`
pub async fn validate(state: &AppState, body: &Bytes) -> Result<HttpResponse> {
    let request: ValidateAnswerRequest = parse_json_body(body)?;
    let user_answer = request
        .user_answer
        .ok_or_else(|| QuizwayError::Validation("user_answer is required".to_string()))?;

    let verdict = state
        .validator
        .validate(&request.question_id, &user_answer)
        .await?;

    Ok(json_response(
        StatusCode::OK,
        &json!({
            "correct": verdict.correct,
            "user_answer": user_answer,
            "std_answer": verdict.standard_answer,
            "explanation": verdict.explanation,
        }),
    ))
}

/// `GET /api/v1/quiz/{id}/explanation`
pub async fn explanation(state: &AppState, id: &str) -> Result<HttpResponse> {
    let explanation = state.validator.explanation(id).await?;
    Ok(json_response(StatusCode::OK, &explanation))
}
