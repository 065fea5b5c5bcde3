//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling.

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Args;
use crate::db::QuestionStore;
use crate::quiz::{AnswerValidator, MetadataCatalog, QuizGenerator};
use crate::routes::{self, response::error_response, HttpResponse};
use crate::types::QuizwayError;

/// Largest request body accepted
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Question repository (MongoDB or in-memory)
    pub store: Arc<dyn QuestionStore>,
    pub generator: QuizGenerator,
    pub validator: AnswerValidator,
    pub catalog: MetadataCatalog,
    pub started_at: Instant,
}

impl AppState {
    /// Wire the quiz components to one store
    pub fn new(args: Args, store: Arc<dyn QuestionStore>) -> Self {
        let generator = QuizGenerator::new(Arc::clone(&store), args.default_quiz_size);
        let validator = AnswerValidator::new(Arc::clone(&store));
        let catalog = MetadataCatalog::new(Arc::clone(&store));

        Self {
            args,
            store,
            generator,
            validator,
            catalog,
            started_at: Instant::now(),
        }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), QuizwayError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Quizway listening on {} as node {} (store: {})",
        state.args.listen,
        state.args.node_id,
        state.store.backend()
    );

    if state.args.dev_mode {
        warn!("Development mode enabled");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Read the body and hand off to the router
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    let started = Instant::now();

    let response = match Limited::new(req.into_body(), MAX_BODY_BYTES).collect().await {
        Ok(collected) => route(&state, &method, &path, query.as_deref(), collected.to_bytes()).await,
        Err(e) if e.is::<LengthLimitError>() => error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "request body too large",
            "PAYLOAD_TOO_LARGE",
        ),
        Err(e) => {
            warn!("Failed to read request body from {}: {}", addr, e);
            error_response(
                StatusCode::BAD_REQUEST,
                "request body could not be read",
                "VALIDATION_ERROR",
            )
        }
    };

    info!(
        "[{}] {} {} -> {} ({} ms)",
        addr,
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );

    Ok(response)
}

/// Dispatch a fully-read request
pub async fn route(
    state: &AppState,
    method: &Method,
    path: &str,
    query: Option<&str>,
    body: Bytes,
) -> HttpResponse {
    if method == Method::OPTIONS {
        return routes::preflight_response();
    }

    match (method, path) {
        (&Method::GET, "/ping") => routes::ping(),

        // Liveness probe
        (&Method::GET, "/health") | (&Method::GET, "/healthz") => routes::health_check(state),

        // Readiness probe - 200 only if the store answers
        (&Method::GET, "/ready") | (&Method::GET, "/readyz") => {
            routes::readiness_check(state).await
        }

        (&Method::GET, "/version") => routes::version_info(),

        (_, p) if p.starts_with(routes::API_PREFIX) => {
            routes::handle_api_request(state, method, p, query, &body).await
        }

        _ => routes::not_found_response(path),
    }
}
