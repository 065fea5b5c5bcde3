//! Quizway importer - sync a JSON question file into MongoDB
//!
//! Usage:
//!   quizway-import --file ./questions.json --mongodb-uri mongodb://localhost:27017
//!
//! Records are matched by `uuid`, then by `id`. New records get a `uuid`
//! assigned by the store; when that happens the file is rewritten so the next
//! import updates instead of duplicating.
//!
//! Environment variables:
//!   IMPORT_FILE - path to the JSON array of questions
//!   MONGODB_URI, MONGODB_DB, MONGODB_COLLECTION - target collection
//!   IMPORT_TIMEOUT_MS - time budget per store operation (default: 10000)

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use quizway::config::MongoArgs;
use quizway::db::{MongoQuestionStore, StoreTimeouts};
use quizway::services::{parse_records, sync_questions};

#[derive(Parser, Debug)]
#[command(name = "quizway-import")]
#[command(about = "Sync a JSON question file into the question store")]
#[command(version)]
struct Args {
    /// JSON file holding an array of question records
    #[arg(long, env = "IMPORT_FILE", default_value = "./questions.json")]
    file: PathBuf,

    #[command(flatten)]
    mongo: MongoArgs,

    /// Time budget for each store operation in milliseconds
    #[arg(long, env = "IMPORT_TIMEOUT_MS", default_value = "10000")]
    timeout_ms: u64,

    /// Report what would change without writing the file back
    #[arg(long)]
    no_write_back: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,quizway=debug")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let raw = tokio::fs::read_to_string(&args.file).await?;
    let mut records = parse_records(&raw)?;
    if records.is_empty() {
        info!("{} holds no records, nothing to do", args.file.display());
        return Ok(());
    }

    let budget = Duration::from_millis(args.timeout_ms);
    let timeouts = StoreTimeouts {
        lookup: budget,
        query: budget,
        sample: budget,
    };

    // Connecting also ensures the collection's indexes
    let store = match MongoQuestionStore::connect(
        &args.mongo.mongodb_uri,
        &args.mongo.mongodb_db,
        &args.mongo.mongodb_collection,
        timeouts,
    )
    .await
    {
        Ok(store) => store,
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            std::process::exit(1);
        }
    };

    let report = sync_questions(&store, &mut records).await?;

    if report.needs_write_back() && !args.no_write_back {
        let rendered = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(&args.file, rendered).await?;
        info!(
            "Wrote {} new uuid(s) back to {}",
            report.assigned_keys,
            args.file.display()
        );
    }

    info!(
        "Import complete: {} inserted, {} updated, {} failed",
        report.inserted, report.updated, report.failed
    );

    if report.failed > 0 {
        std::process::exit(2);
    }
    Ok(())
}
