//! Question repository
//!
//! `QuestionStore` is the seam between quiz logic and persistence. The
//! MongoDB implementation is used in production; the in-memory one backs
//! dev mode and tests.

pub mod memory;
pub mod mongo;
pub mod question_store;
pub mod schemas;

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

use crate::db::schemas::{Question, STORE_OWNED_FIELDS};
use crate::quiz::filter::QuestionFilter;
use crate::types::{QuizwayError, Result};

pub use memory::MemoryQuestionStore;
pub use mongo::{IntoIndexes, MongoClient, MongoCollection};
pub use question_store::MongoQuestionStore;

/// Per-operation time budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreTimeouts {
    /// Single-record lookups
    pub lookup: Duration,
    /// Lists, aggregations and writes
    pub query: Duration,
    /// Random sampling for quiz generation
    pub sample: Duration,
}

/// Run a store operation under a time budget.
///
/// On expiry the inner future is dropped, so nothing partial escapes.
pub async fn with_timeout<T, F>(budget: Duration, operation: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(result) => result,
        Err(_) => Err(QuizwayError::Timeout(format!(
            "{operation} exceeded {}ms",
            budget.as_millis()
        ))),
    }
}

/// Identifier resolved against the collection.
///
/// Strings that parse as an ObjectId address the record key; anything else
/// is a human question code. `Uuid` is only built by the importer, which
/// matches on the stored `uuid` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionRef {
    Key(ObjectId),
    Code(String),
    Uuid(String),
}

impl QuestionRef {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(QuizwayError::Validation(
                "question id is required".to_string(),
            ));
        }

        Ok(match ObjectId::parse_str(raw) {
            Ok(key) => Self::Key(key),
            Err(_) => Self::Code(raw.to_string()),
        })
    }

    pub fn to_filter(&self) -> Document {
        match self {
            Self::Key(key) => doc! { "_id": *key },
            Self::Code(code) => doc! { "id": code.as_str() },
            Self::Uuid(uuid) => doc! { "uuid": uuid.as_str() },
        }
    }

    pub fn matches(&self, question: &Question) -> bool {
        match self {
            Self::Key(key) => question.record_key.as_ref() == Some(key),
            Self::Code(code) => &question.id == code,
            Self::Uuid(uuid) => question.uuid.as_deref() == Some(uuid.as_str()),
        }
    }
}

impl std::fmt::Display for QuestionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{}", key.to_hex()),
            Self::Code(code) => f.write_str(code),
            Self::Uuid(uuid) => write!(f, "uuid {uuid}"),
        }
    }
}

/// One subject with the chapters its questions reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectChapters {
    pub name: String,
    pub chapters: Vec<String>,
}

/// Clean a client-supplied field mapping before it is merged into a record.
///
/// Store-owned fields are dropped silently; operator keys are rejected, as is
/// a mapping with nothing left to set.
pub fn sanitize_update(mut fields: Document) -> Result<Document> {
    for field in STORE_OWNED_FIELDS {
        fields.remove(field);
    }

    if let Some(key) = fields.keys().find(|k| k.starts_with('$') || k.is_empty()) {
        return Err(QuizwayError::Validation(format!(
            "Invalid update field: '{key}'"
        )));
    }

    if fields.is_empty() {
        return Err(QuizwayError::Validation(
            "update contains no writable fields".to_string(),
        ));
    }

    Ok(fields)
}

/// Write `value` at a dotted path, creating intermediate documents
fn set_path(target: &mut Document, path: &str, value: Bson) -> Result<()> {
    match path.split_once('.') {
        None => {
            target.insert(path, value);
            Ok(())
        }
        Some((head, rest)) => {
            let entry = target
                .entry(head.to_string())
                .or_insert_with(|| Bson::Document(Document::new()));
            match entry {
                Bson::Document(child) => set_path(child, rest, value),
                _ => Err(QuizwayError::Validation(format!(
                    "Cannot set '{path}': '{head}' is not an object"
                ))),
            }
        }
    }
}

/// Merge sanitized `fields` into a stored record and decode the result.
///
/// Both backends run this before writing, so an update that would leave the
/// record unreadable is rejected and nothing is stored.
pub fn apply_update(mut record: Document, fields: &Document) -> Result<Question> {
    for (path, value) in fields {
        set_path(&mut record, path, value.clone())?;
    }

    Question::from_document(record).map_err(|e| {
        QuizwayError::Validation(format!("Update produces an invalid question: {e}"))
    })
}

/// Question persistence
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Point lookup; `None` when nothing matches
    async fn find_by_id(&self, id: &QuestionRef) -> Result<Option<Question>>;

    /// All questions matching the filter, no sampling
    async fn list_by_filter(&self, filter: &QuestionFilter) -> Result<Vec<Question>>;

    /// Uniform random sample without replacement, at most `limit` items
    async fn sample_by_filter(&self, filter: &QuestionFilter, limit: usize)
        -> Result<Vec<Question>>;

    /// Insert a new question; the store assigns the record key and `uuid`
    async fn insert(&self, question: Question) -> Result<ObjectId>;

    /// Merge `fields` (dotted paths allowed) into the matching record
    async fn update_fields(&self, id: &QuestionRef, fields: Document) -> Result<()>;

    /// Hard delete
    async fn delete(&self, id: &QuestionRef) -> Result<()>;

    /// Distinct scalar values at a dotted field path; arrays are flattened
    async fn distinct(&self, field_path: &str) -> Result<Vec<Bson>>;

    /// Subjects sorted ascending with their deduplicated, sorted chapters
    async fn subject_chapters(&self) -> Result<Vec<SubjectChapters>>;

    /// Connectivity check for readiness probes
    async fn ping(&self) -> Result<()>;

    /// Backend name for logs and probes
    fn backend(&self) -> &'static str;
}
