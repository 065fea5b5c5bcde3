//! Quizway - question bank and quiz service
//!
//! Stores quiz questions in MongoDB and serves them over HTTP.
//!
//! ## Components
//!
//! - **Repository** (`db`): question documents behind the `QuestionStore`
//!   trait, with MongoDB and in-memory backends
//! - **Quiz** (`quiz`): filter building, random sampling, answer redaction,
//!   grading and metadata aggregation
//! - **HTTP** (`server`, `routes`): thin hyper adapter under `/api/v1`
//! - **Import** (`services`): JSON file sync with key backfill

pub mod config;
pub mod db;
pub mod quiz;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{QuizwayError, Result};
