//! Quizway - question bank and quiz service

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quizway::{
    config::Args,
    db::{MemoryQuestionStore, MongoQuestionStore, QuestionStore},
    server, QuizwayError,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("quizway={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate().map_err(QuizwayError::Config) {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Quizway - question bank and quizzes");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!(
        "MongoDB: database '{}', collection '{}'",
        args.mongo.mongodb_db, args.mongo.mongodb_collection
    );
    info!(
        "Timeouts: lookup {} ms, query {} ms, sample {} ms",
        args.lookup_timeout_ms, args.query_timeout_ms, args.sample_timeout_ms
    );
    info!("Default quiz size: {}", args.default_quiz_size);
    info!("======================================");

    // MongoDB is required outside dev mode
    let store: Arc<dyn QuestionStore> = match MongoQuestionStore::connect(
        &args.mongo.mongodb_uri,
        &args.mongo.mongodb_db,
        &args.mongo.mongodb_collection,
        args.store_timeouts(),
    )
    .await
    {
        Ok(store) => {
            info!("MongoDB connected successfully");
            Arc::new(store)
        }
        Err(e) => {
            if args.dev_mode {
                warn!(
                    "MongoDB connection failed (dev mode, using in-memory store): {}",
                    e
                );
                Arc::new(MemoryQuestionStore::new())
            } else {
                error!("MongoDB connection failed: {}", e);
                std::process::exit(1);
            }
        }
    };

    let state = Arc::new(server::AppState::new(args, store));

    tokio::select! {
        result = server::run(state) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    Ok(())
}
