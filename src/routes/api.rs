//! Versioned API dispatch
//!
//! Everything under `/api/v1` is routed here by path segments. Handlers
//! return `Result<HttpResponse>`; failures are mapped to status codes in one
//! place.

use bytes::Bytes;
use hyper::Method;

use crate::routes::response::{
    decode_segment, method_not_allowed_response, not_found_response, respond, HttpResponse,
};
use crate::routes::{meta, questions, quiz};
use crate::server::AppState;
use crate::types::Result;

pub const API_PREFIX: &str = "/api/v1";

/// Route a request whose path starts with [`API_PREFIX`]
pub async fn handle_api_request(
    state: &AppState,
    method: &Method,
    path: &str,
    query: Option<&str>,
    body: &Bytes,
) -> HttpResponse {
    let Some(rest) = path.strip_prefix(API_PREFIX) else {
        return not_found_response(path);
    };
    let segments: Vec<&str> = rest.trim_matches('/').split('/').collect();

    match (method, segments.as_slice()) {
        (&Method::GET, ["questions"]) => respond(questions::list(state, query).await),
        (&Method::POST, ["questions"]) => respond(questions::create(state, body).await),
        (&Method::GET, ["questions", id]) => {
            respond(with_id(id, |id| async move { questions::get(state, &id).await }).await)
        }
        (&Method::PUT, ["questions", id]) => {
            respond(with_id(id, |id| async move { questions::update(state, &id, body).await }).await)
        }
        (&Method::DELETE, ["questions", id]) => {
            respond(with_id(id, |id| async move { questions::delete(state, &id).await }).await)
        }

        (&Method::POST, ["quiz", "generate"]) => respond(quiz::generate(state, body).await),
        (&Method::POST, ["quiz", "validate"]) => respond(quiz::validate(state, body).await),
        (&Method::GET, ["quiz", id, "explanation"]) => {
            respond(with_id(id, |id| async move { quiz::explanation(state, &id).await }).await)
        }

        (&Method::GET, ["meta", "subjects"]) => respond(meta::subjects(state).await),
        (&Method::GET, ["meta", "tags"]) => respond(meta::tags(state).await),
        (&Method::GET, ["meta", "options"]) => respond(meta::options(state).await),

        (_, ["questions"])
        | (_, ["questions", _])
        | (_, ["quiz", "generate" | "validate"])
        | (_, ["quiz", _, "explanation"])
        | (_, ["meta", "subjects" | "tags" | "options"]) => {
            method_not_allowed_response(method, path)
        }

        _ => not_found_response(path),
    }
}

/// Percent-decode an id segment before handing it to a handler
async fn with_id<F, Fut>(segment: &str, handler: F) -> Result<HttpResponse>
where
    F: FnOnce(String) -> Fut,
    Fut: std::future::Future<Output = Result<HttpResponse>>,
{
    let id = decode_segment(segment)?;
    handler(id).await
}
