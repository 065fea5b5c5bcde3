//! Batch services run outside the request path

pub mod import;

pub use import::{parse_records, sync_questions, ImportReport, QuestionRecord};
