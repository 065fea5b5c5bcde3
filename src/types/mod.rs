//! Shared types for Quizway

pub mod error;

pub use error::{QuizwayError, Result};
