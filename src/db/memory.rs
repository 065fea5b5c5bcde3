//! In-memory question store
//!
//! Used in dev mode when MongoDB is unreachable and as the test double for
//! everything above the repository.

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use dashmap::DashMap;
use rand::seq::SliceRandom;
use std::collections::{BTreeMap, BTreeSet};

use crate::db::schemas::Question;
use crate::db::{apply_update, sanitize_update, QuestionRef, QuestionStore, SubjectChapters};
use crate::quiz::filter::QuestionFilter;
use crate::types::{QuizwayError, Result};

/// Question store held in a concurrent map keyed by record key
#[derive(Default)]
pub struct MemoryQuestionStore {
    questions: DashMap<ObjectId, Question>,
}

impl MemoryQuestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Store a question exactly as given, keeping its record key and `uuid`
    #[cfg(test)]
    pub(crate) fn insert_as_is(&self, key: ObjectId, mut question: Question) {
        question.record_key = Some(key);
        self.questions.insert(key, question);
    }

    /// Record key of the first question matching `id`, lowest key first
    fn resolve(&self, id: &QuestionRef) -> Option<ObjectId> {
        match id {
            QuestionRef::Key(key) => self.questions.contains_key(key).then_some(*key),
            QuestionRef::Code(_) | QuestionRef::Uuid(_) => self
                .questions
                .iter()
                .filter(|entry| id.matches(entry.value()))
                .map(|entry| *entry.key())
                .min(),
        }
    }

    /// Matching questions ordered by record key (insertion order)
    fn matching(&self, filter: &QuestionFilter) -> Vec<Question> {
        let mut found: Vec<Question> = self
            .questions
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by_key(|q| q.record_key);
        found
    }
}

/// Collect scalar values at a dotted path, flattening arrays on the way
fn collect_path(value: &Bson, path: &[&str], out: &mut Vec<Bson>) {
    match value {
        Bson::Array(items) => {
            for item in items {
                collect_path(item, path, out);
            }
        }
        Bson::Document(document) => {
            if let Some((head, rest)) = path.split_first() {
                if let Some(child) = document.get(*head) {
                    collect_path(child, rest, out);
                }
            }
        }
        Bson::Null => {}
        scalar if path.is_empty() => out.push(scalar.clone()),
        _ => {}
    }
}

#[async_trait]
impl QuestionStore for MemoryQuestionStore {
    async fn find_by_id(&self, id: &QuestionRef) -> Result<Option<Question>> {
        Ok(self
            .resolve(id)
            .and_then(|key| self.questions.get(&key).map(|q| q.value().clone())))
    }

    async fn list_by_filter(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        Ok(self.matching(filter))
    }

    async fn sample_by_filter(
        &self,
        filter: &QuestionFilter,
        limit: usize,
    ) -> Result<Vec<Question>> {
        let mut pool = self.matching(filter);
        pool.shuffle(&mut rand::thread_rng());
        pool.truncate(limit);
        Ok(pool)
    }

    async fn insert(&self, mut question: Question) -> Result<ObjectId> {
        let key = ObjectId::new();
        question.record_key = Some(key);
        question.uuid = Some(key.to_hex());
        self.questions.insert(key, question);
        Ok(key)
    }

    async fn update_fields(&self, id: &QuestionRef, fields: Document) -> Result<()> {
        let fields = sanitize_update(fields)?;
        let key = self
            .resolve(id)
            .ok_or_else(|| QuizwayError::NotFound(format!("question {id}")))?;

        let mut entry = self
            .questions
            .get_mut(&key)
            .ok_or_else(|| QuizwayError::NotFound(format!("question {id}")))?;

        let updated = apply_update(entry.to_document()?, &fields)?;
        *entry = updated;
        Ok(())
    }

    async fn delete(&self, id: &QuestionRef) -> Result<()> {
        let key = self
            .resolve(id)
            .ok_or_else(|| QuizwayError::NotFound(format!("question {id}")))?;
        self.questions.remove(&key);
        Ok(())
    }

    async fn distinct(&self, field_path: &str) -> Result<Vec<Bson>> {
        let path: Vec<&str> = field_path.split('.').collect();
        let mut values = Vec::new();

        for entry in self.questions.iter() {
            let document = entry.value().to_document()?;
            collect_path(&Bson::Document(document), &path, &mut values);
        }

        let mut seen = BTreeSet::new();
        values.retain(|value| seen.insert(value.to_string()));
        Ok(values)
    }

    async fn subject_chapters(&self) -> Result<Vec<SubjectChapters>> {
        let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for entry in self.questions.iter() {
            let question = entry.value();
            let chapters = groups.entry(question.subject.clone()).or_default();
            chapters.extend(question.meta.chapter_names().into_iter().map(str::to_string));
        }

        Ok(groups
            .into_iter()
            .map(|(name, chapters)| SubjectChapters {
                name,
                chapters: chapters.into_iter().collect(),
            })
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
