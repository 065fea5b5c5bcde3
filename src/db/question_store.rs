//! MongoDB-backed question store

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use futures_util::TryStreamExt;
use tracing::{debug, info};

use crate::db::schemas::Question;
use crate::db::{
    apply_update, sanitize_update, with_timeout, MongoClient, MongoCollection, QuestionRef,
    QuestionStore, StoreTimeouts, SubjectChapters,
};
use crate::quiz::filter::QuestionFilter;
use crate::types::{QuizwayError, Result};

/// Question store over a MongoDB collection
#[derive(Clone)]
pub struct MongoQuestionStore {
    client: MongoClient,
    questions: MongoCollection<Question>,
    timeouts: StoreTimeouts,
}

impl MongoQuestionStore {
    /// Connect, ping and ensure indexes
    pub async fn connect(
        uri: &str,
        db_name: &str,
        collection: &str,
        timeouts: StoreTimeouts,
    ) -> Result<Self> {
        let client = MongoClient::new(uri, db_name).await?;
        let questions = client.collection::<Question>(collection).await?;
        info!(collection = %collection, "Question collection ready");

        Ok(Self {
            client,
            questions,
            timeouts,
        })
    }
}

/// Turn the `$group` output of the subject/chapter pipeline into entries
fn subject_entry(group: &Document) -> Option<SubjectChapters> {
    let name = group.get_str("_id").ok()?.to_string();
    let mut chapters: Vec<String> = group
        .get_array("chapters")
        .map(|values| {
            values
                .iter()
                .filter_map(Bson::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    chapters.sort();
    chapters.dedup();
    Some(SubjectChapters { name, chapters })
}

#[async_trait]
impl QuestionStore for MongoQuestionStore {
    async fn find_by_id(&self, id: &QuestionRef) -> Result<Option<Question>> {
        with_timeout(self.timeouts.lookup, "find_by_id", async {
            Ok(self.questions.inner().find_one(id.to_filter()).await?)
        })
        .await
    }

    async fn list_by_filter(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        let query = filter.to_document();
        debug!(filter = %query, "Listing questions");

        with_timeout(self.timeouts.query, "list_by_filter", async {
            let cursor = self.questions.inner().find(query).await?;
            Ok(cursor.try_collect().await?)
        })
        .await
    }

    async fn sample_by_filter(
        &self,
        filter: &QuestionFilter,
        limit: usize,
    ) -> Result<Vec<Question>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let size = i64::try_from(limit)
            .map_err(|_| QuizwayError::Validation(format!("limit {limit} is too large")))?;
        let pipeline = vec![
            doc! { "$match": filter.to_document() },
            doc! { "$sample": { "size": size } },
        ];
        debug!(?pipeline, "Sampling questions");

        with_timeout(self.timeouts.sample, "sample_by_filter", async {
            let documents: Vec<Document> = self
                .questions
                .inner()
                .aggregate(pipeline)
                .await?
                .try_collect()
                .await?;
            documents.into_iter().map(Question::from_document).collect()
        })
        .await
    }

    async fn insert(&self, mut question: Question) -> Result<ObjectId> {
        let key = ObjectId::new();
        question.record_key = Some(key);
        question.uuid = Some(key.to_hex());

        with_timeout(self.timeouts.query, "insert", async {
            self.questions.inner().insert_one(question).await?;
            Ok(key)
        })
        .await
    }

    async fn update_fields(&self, id: &QuestionRef, fields: Document) -> Result<()> {
        let fields = sanitize_update(fields)?;

        with_timeout(self.timeouts.query, "update_fields", async {
            let current = self
                .questions
                .raw()
                .find_one(id.to_filter())
                .await?
                .ok_or_else(|| QuizwayError::NotFound(format!("question {id}")))?;
            let key = current.get_object_id("_id").map_err(|e| {
                QuizwayError::DataIntegrity(format!("question {id} has no record key: {e}"))
            })?;

            // Only write what would still decode afterwards
            apply_update(current, &fields)?;

            let result = self
                .questions
                .inner()
                .update_one(doc! { "_id": key }, doc! { "$set": fields })
                .await?;
            if result.matched_count == 0 {
                return Err(QuizwayError::NotFound(format!("question {id}")));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: &QuestionRef) -> Result<()> {
        let result = with_timeout(self.timeouts.query, "delete", async {
            Ok(self.questions.inner().delete_one(id.to_filter()).await?)
        })
        .await?;

        if result.deleted_count == 0 {
            return Err(QuizwayError::NotFound(format!("question {id}")));
        }
        Ok(())
    }

    async fn distinct(&self, field_path: &str) -> Result<Vec<Bson>> {
        with_timeout(self.timeouts.query, "distinct", async {
            Ok(self
                .questions
                .inner()
                .distinct(field_path, Document::new())
                .await?)
        })
        .await
    }

    async fn subject_chapters(&self) -> Result<Vec<SubjectChapters>> {
        let pipeline = vec![
            doc! { "$unwind": { "path": "$meta.chapter", "preserveNullAndEmptyArrays": true } },
            doc! { "$group": { "_id": "$subject", "chapters": { "$addToSet": "$meta.chapter" } } },
            doc! { "$sort": { "_id": 1 } },
        ];

        with_timeout(self.timeouts.query, "subject_chapters", async {
            let groups: Vec<Document> = self
                .questions
                .raw()
                .aggregate(pipeline)
                .await?
                .try_collect()
                .await?;
            Ok(groups.iter().filter_map(subject_entry).collect())
        })
        .await
    }

    async fn ping(&self) -> Result<()> {
        with_timeout(self.timeouts.lookup, "ping", self.client.ping()).await
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_entry_sorts_and_drops_non_strings() {
        let group = doc! { "_id": "math", "chapters": ["b", "a", Bson::Null, "b"] };
        let entry = subject_entry(&group).unwrap();
        assert_eq!(entry.name, "math");
        assert_eq!(entry.chapters, vec!["a", "b"]);
    }

    #[test]
    fn test_subject_entry_skips_missing_subject() {
        assert!(subject_entry(&doc! { "_id": Bson::Null, "chapters": [] }).is_none());
    }
}
