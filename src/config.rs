//! Configuration for Quizway
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use uuid::Uuid;

use crate::db::StoreTimeouts;

/// Quizway - question bank and quiz service
#[derive(Parser, Debug, Clone)]
#[command(name = "quizway")]
#[command(about = "Question bank CRUD, randomized quizzes and answer checking over MongoDB")]
pub struct Args {
    /// Unique node identifier for this instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Enable development mode (falls back to the in-memory store when
    /// MongoDB is unreachable)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// MongoDB connection settings
    #[command(flatten)]
    pub mongo: MongoArgs,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Time budget for single-record lookups in milliseconds
    #[arg(long, env = "LOOKUP_TIMEOUT_MS", default_value = "5000")]
    pub lookup_timeout_ms: u64,

    /// Time budget for list, aggregate and write operations in milliseconds
    #[arg(long, env = "QUERY_TIMEOUT_MS", default_value = "10000")]
    pub query_timeout_ms: u64,

    /// Time budget for quiz sampling in milliseconds
    #[arg(long, env = "SAMPLE_TIMEOUT_MS", default_value = "30000")]
    pub sample_timeout_ms: u64,

    /// Quiz size used when a generation request asks for zero or fewer questions
    #[arg(long, env = "DEFAULT_QUIZ_SIZE", default_value = "10")]
    pub default_quiz_size: usize,
}

/// MongoDB connection configuration
#[derive(Parser, Debug, Clone)]
pub struct MongoArgs {
    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "quiz_system")]
    pub mongodb_db: String,

    /// Collection holding question documents
    #[arg(long, env = "MONGODB_COLLECTION", default_value = "questions")]
    pub mongodb_collection: String,
}

impl Args {
    /// Per-operation time budgets for the store
    pub fn store_timeouts(&self) -> StoreTimeouts {
        StoreTimeouts {
            lookup: Duration::from_millis(self.lookup_timeout_ms),
            query: Duration::from_millis(self.query_timeout_ms),
            sample: Duration::from_millis(self.sample_timeout_ms),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.lookup_timeout_ms == 0 || self.query_timeout_ms == 0 || self.sample_timeout_ms == 0 {
            return Err("store timeouts must be greater than zero".to_string());
        }

        if self.default_quiz_size == 0 {
            return Err("DEFAULT_QUIZ_SIZE must be at least 1".to_string());
        }

        if self.mongo.mongodb_collection.trim().is_empty() {
            return Err("MONGODB_COLLECTION must not be empty".to_string());
        }

        Ok(())
    }
}
