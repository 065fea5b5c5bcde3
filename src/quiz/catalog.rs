//! Metadata for UI pickers: distinct values and subject/chapter index

use bson::Bson;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::db::{QuestionStore, SubjectChapters};
use crate::types::{QuizwayError, Result};

#[derive(Clone)]
pub struct MetadataCatalog {
    store: Arc<dyn QuestionStore>,
}

impl MetadataCatalog {
    pub fn new(store: Arc<dyn QuestionStore>) -> Self {
        Self { store }
    }

    /// Distinct scalar values at `field_path`, as JSON, sorted for stable output
    pub async fn distinct_values(&self, field_path: &str) -> Result<Vec<JsonValue>> {
        let field_path = field_path.trim();
        if field_path.is_empty() || field_path.contains('$') {
            return Err(QuizwayError::Validation(format!(
                "Invalid field path: '{field_path}'"
            )));
        }

        let mut values: Vec<JsonValue> = self
            .store
            .distinct(field_path)
            .await?
            .into_iter()
            .filter(|value| !matches!(value, Bson::Null))
            .map(Bson::into_relaxed_extjson)
            .collect();
        values.sort_by_key(|value| value.to_string());
        Ok(values)
    }

    pub async fn subjects(&self) -> Result<Vec<JsonValue>> {
        self.distinct_values("subject").await
    }

    pub async fn tags(&self) -> Result<Vec<JsonValue>> {
        self.distinct_values("meta.tags").await
    }

    /// Subjects ascending, each with its deduplicated chapters
    pub async fn subject_chapter_index(&self) -> Result<Vec<SubjectChapters>> {
        self.store.subject_chapters().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{Chapter, Question, QuestionMeta};
    use crate::db::MemoryQuestionStore;
    use serde_json::json;

    async fn catalog() -> MetadataCatalog {
        let store = Arc::new(MemoryQuestionStore::new());
        let rows = [
            ("physics", vec!["optics"], vec!["waves"]),
            ("math", vec!["ch1", "ch2"], vec!["algebra", "core"]),
            ("math", vec!["ch2"], vec!["core"]),
        ];
        for (i, (subject, chapters, tags)) in rows.into_iter().enumerate() {
            store
                .insert(Question {
                    id: format!("Q_{i}"),
                    subject: subject.to_string(),
                    meta: QuestionMeta {
                        chapter: Some(Chapter::Many(
                            chapters.into_iter().map(str::to_string).collect(),
                        )),
                        tags: tags.into_iter().map(str::to_string).collect(),
                        ..Default::default()
                    },
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        MetadataCatalog::new(store)
    }

    #[tokio::test]
    async fn test_subjects_and_tags() {
        let catalog = catalog().await;
        assert_eq!(catalog.subjects().await.unwrap(), vec![json!("math"), json!("physics")]);
        assert_eq!(
            catalog.tags().await.unwrap(),
            vec![json!("algebra"), json!("core"), json!("waves")]
        );
    }

    #[tokio::test]
    async fn test_subject_chapter_index_flattens_arrays() {
        let index = catalog().await.subject_chapter_index().await.unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index[0].name, "math");
        assert_eq!(index[0].chapters, vec!["ch1", "ch2"]);
        assert_eq!(index[1].chapters, vec!["optics"]);
    }

    #[tokio::test]
    async fn test_rejects_operator_paths() {
        let catalog = catalog().await;
        assert!(catalog.distinct_values("$where").await.is_err());
        assert!(catalog.distinct_values(" ").await.is_err());
    }
}
