//! Question file import
//!
//! Syncs a JSON array of question records into the store. Each record is
//! matched by `uuid` first, then by its human `id`; matches are updated in
//! place, everything else is inserted. Inserted records get the store's key
//! written back into their `uuid` so the file can be re-imported without
//! creating duplicates.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, info, warn};

use crate::db::schemas::Question;
use crate::db::{QuestionRef, QuestionStore};
use crate::types::{QuizwayError, Result};

pub type QuestionRecord = Map<String, JsonValue>;

/// Outcome of one sync run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
    /// Records whose `uuid` was (re)assigned; the source file is stale if > 0
    pub assigned_keys: usize,
}

impl ImportReport {
    pub fn needs_write_back(&self) -> bool {
        self.assigned_keys > 0
    }
}

fn string_field<'a>(record: &'a QuestionRecord, field: &str) -> Option<&'a str> {
    record
        .get(field)
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Find the stored record this file entry corresponds to
async fn find_existing(
    store: &dyn QuestionStore,
    uuid: Option<&str>,
    code: Option<&str>,
) -> Result<Option<(QuestionRef, &'static str)>> {
    if let Some(uuid) = uuid {
        let by_uuid = QuestionRef::Uuid(uuid.to_string());
        if store.find_by_id(&by_uuid).await?.is_some() {
            return Ok(Some((by_uuid, "uuid")));
        }
    }

    if let Some(code) = code {
        let by_code = QuestionRef::Code(code.to_string());
        if store.find_by_id(&by_code).await?.is_some() {
            return Ok(Some((by_code, "id")));
        }
    }

    Ok(None)
}

async fn sync_one(store: &dyn QuestionStore, record: &mut QuestionRecord) -> Result<Outcome> {
    record.remove("_id");
    let uuid = string_field(record, "uuid").map(str::to_string);
    let code = string_field(record, "id").map(str::to_string);

    if let Some((target, matched_by)) =
        find_existing(store, uuid.as_deref(), code.as_deref()).await?
    {
        debug!(question = %target, matched_by, "Updating existing question");
        let fields = bson::to_document(&*record)?;
        store.update_fields(&target, fields).await?;
        return Ok(Outcome::Updated);
    }

    let question = Question::from_client_json(JsonValue::Object(record.clone()))?;
    let key = store.insert(question).await?;
    let assigned = key.to_hex();
    debug!(code = ?code, record_key = %assigned, "Inserted question");

    if uuid.as_deref() == Some(assigned.as_str()) {
        Ok(Outcome::Inserted { rekeyed: false })
    } else {
        record.insert("uuid".to_string(), JsonValue::String(assigned));
        Ok(Outcome::Inserted { rekeyed: true })
    }
}

enum Outcome {
    Inserted { rekeyed: bool },
    Updated,
}

/// Sync `records` into `store`, rewriting each inserted record's `uuid`.
///
/// A failing record is logged and counted; the rest still run. A store that
/// is unreachable or timing out aborts the run.
pub async fn sync_questions(
    store: &dyn QuestionStore,
    records: &mut [QuestionRecord],
) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    info!("Syncing {} question records", records.len());

    for (index, record) in records.iter_mut().enumerate() {
        match sync_one(store, record).await {
            Ok(Outcome::Updated) => report.updated += 1,
            Ok(Outcome::Inserted { rekeyed }) => {
                report.inserted += 1;
                if rekeyed {
                    report.assigned_keys += 1;
                }
            }
            Err(e) if e.is_transient() => return Err(e),
            Err(e) => {
                warn!(index, "Skipping question record: {}", e);
                report.failed += 1;
            }
        }
    }

    info!(
        inserted = report.inserted,
        updated = report.updated,
        failed = report.failed,
        assigned_keys = report.assigned_keys,
        "Question sync finished"
    );
    Ok(report)
}

/// Parse the import file: a JSON array of objects
pub fn parse_records(raw: &str) -> Result<Vec<QuestionRecord>> {
    let value: JsonValue = serde_json::from_str(raw)?;
    let JsonValue::Array(items) = value else {
        return Err(QuizwayError::Validation(
            "import file must contain a JSON array".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            JsonValue::Object(record) => Ok(record),
            _ => Err(QuizwayError::Validation(format!(
                "record {index} is not a JSON object"
            ))),
        })
        .collect()
}
