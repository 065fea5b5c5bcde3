//! Health check endpoints
//!
//! - /ping - trivial liveness reply
//! - /health, /healthz - liveness probe with service details
//! - /ready, /readyz - readiness probe; 200 only if the question store
//!   answers a ping
//! - /version - build information

use hyper::StatusCode;
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use crate::routes::response::{json_response, HttpResponse};
use crate::server::AppState;

/// Store connectivity details
#[derive(Serialize)]
pub struct StoreHealth {
    /// "mongodb" or "memory"
    pub backend: &'static str,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    /// 'online' or 'degraded'
    pub status: &'static str,
    pub version: &'static str,
    /// Seconds since the server started
    pub uptime: u64,
    pub timestamp: String,
    pub mode: &'static str,
    pub node_id: String,
    pub store: StoreHealth,
}

fn build_health_response(state: &AppState, store: StoreHealth) -> HealthResponse {
    HealthResponse {
        healthy: true,
        status: if store.connected { "online" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        node_id: state.args.node_id.to_string(),
        store,
    }
}

/// `GET /ping`
pub fn ping() -> HttpResponse {
    json_response(
        StatusCode::OK,
        &json!({ "message": "pong", "system": "Quizway" }),
    )
}

/// Liveness probe: always 200 while the process serves requests
pub fn health_check(state: &AppState) -> HttpResponse {
    let store = StoreHealth {
        backend: state.store.backend(),
        connected: true,
        error: None,
    };
    json_response(StatusCode::OK, &build_health_response(state, store))
}

/// Readiness probe: pings the store
pub async fn readiness_check(state: &AppState) -> HttpResponse {
    let store = match state.store.ping().await {
        Ok(()) => StoreHealth {
            backend: state.store.backend(),
            connected: true,
            error: None,
        },
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            StoreHealth {
                backend: state.store.backend(),
                connected: false,
                error: Some(e.public_message()),
            }
        }
    };

    let status = if store.connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    json_response(status, &build_health_response(state, store))
}

/// Version information for deployment verification
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub commit: &'static str,
    pub commit_full: &'static str,
    pub build_time: &'static str,
    pub service: &'static str,
}

/// `GET /version`
pub fn version_info() -> HttpResponse {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        commit_full: option_env!("GIT_COMMIT_FULL").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: "quizway",
    };
    json_response(StatusCode::OK, &response)
}
