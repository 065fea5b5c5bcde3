//! Response builders and request parsing shared by all routes

use bytes::Bytes;
use http_body_util::Full;
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, warn};

use crate::types::{QuizwayError, Result};

pub type HttpResponse = Response<Full<Bytes>>;

/// API error body
#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
    code: &'static str,
}

fn cors(builder: Builder) -> Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Cache-Control", "no-cache")
}

/// Finish a builder, degrading to a bare 500 if the parts were invalid
fn finish(builder: Builder, body: Bytes) -> HttpResponse {
    builder.body(Full::new(body)).unwrap_or_else(|_| {
        let mut response = Response::new(Full::new(Bytes::from_static(
            br#"{"error":"Internal error","code":"INTERNAL_ERROR"}"#,
        )));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}

/// Serialize `data` as a JSON response
pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, data: &T) -> HttpResponse {
    match serde_json::to_vec(data) {
        Ok(body) => finish(
            cors(Response::builder().status(status)).header("Content-Type", "application/json"),
            Bytes::from(body),
        ),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "INTERNAL_ERROR",
            )
        }
    }
}

/// Build a JSON error response
pub fn error_response(status: StatusCode, message: &str, code: &'static str) -> HttpResponse {
    let error = ApiError {
        error: message.to_string(),
        code,
    };
    let body = serde_json::to_vec(&error).unwrap_or_default();

    finish(
        cors(Response::builder().status(status)).header("Content-Type", "application/json"),
        Bytes::from(body),
    )
}

/// Map a failure to its status and public message; details go to the log
pub fn from_error(err: &QuizwayError) -> HttpResponse {
    let status = err.status_code();
    if status.is_server_error() {
        error!(code = err.code(), "Request failed: {}", err);
    } else {
        warn!(code = err.code(), "Request rejected: {}", err);
    }
    error_response(status, &err.public_message(), err.code())
}

/// Collapse a handler result into a response
pub fn respond(result: Result<HttpResponse>) -> HttpResponse {
    result.unwrap_or_else(|err| from_error(&err))
}

/// CORS preflight response
pub fn preflight_response() -> HttpResponse {
    finish(
        Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header(
                "Access-Control-Allow-Methods",
                "GET, POST, PUT, DELETE, OPTIONS",
            ),
        Bytes::new(),
    )
}

pub fn not_found_response(path: &str) -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        &format!("No route for {path}"),
        "NOT_FOUND",
    )
}

pub fn method_not_allowed_response(method: &hyper::Method, path: &str) -> HttpResponse {
    error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &format!("{method} is not supported on {path}"),
        "METHOD_NOT_ALLOWED",
    )
}

/// Decode a JSON request body
pub fn parse_json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T> {
    if body.is_empty() {
        return Err(QuizwayError::Validation("request body is empty".to_string()));
    }
    Ok(serde_json::from_slice(body)?)
}

/// Decode a query string into a typed parameter struct
pub fn parse_query<T: DeserializeOwned + Default>(query: Option<&str>) -> Result<T> {
    match query.filter(|q| !q.is_empty()) {
        None => Ok(T::default()),
        Some(query) => serde_urlencoded::from_str(query)
            .map_err(|e| QuizwayError::Validation(format!("Invalid query string: {e}"))),
    }
}

/// Percent-decode a path segment
pub fn decode_segment(segment: &str) -> Result<String> {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .map_err(|_| QuizwayError::Validation("path segment is not valid UTF-8".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Params {
        subject: Option<String>,
        difficulty: Option<String>,
    }

    #[test]
    fn test_parse_query() {
        let params: Params = parse_query(Some("subject=linear%20algebra&difficulty=B")).unwrap();
        assert_eq!(params.subject.as_deref(), Some("linear algebra"));
        assert_eq!(params.difficulty.as_deref(), Some("B"));

        let empty: Params = parse_query(None).unwrap();
        assert_eq!(empty, Params::default());
    }

    #[test]
    fn test_error_mapping() {
        let response = from_error(&QuizwayError::Timeout("find_by_id exceeded 5000ms".into()));
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            response.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
    }

    #[test]
    fn test_empty_body_is_validation_error() {
        let err = parse_json_body::<serde_json::Value>(&Bytes::new()).unwrap_err();
        assert!(matches!(err, QuizwayError::Validation(_)));
    }

    #[test]
    fn test_decode_segment() {
        assert_eq!(decode_segment("Q%5F001").unwrap(), "Q_001");
    }
}
