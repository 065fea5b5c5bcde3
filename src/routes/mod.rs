//! HTTP routes for Quizway

pub mod api;
pub mod health;
pub mod meta;
pub mod questions;
pub mod quiz;
pub mod response;

pub use api::{handle_api_request, API_PREFIX};
pub use health::{health_check, ping, readiness_check, version_info};
pub use response::{not_found_response, preflight_response, HttpResponse};
