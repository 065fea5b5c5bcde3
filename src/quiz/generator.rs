//! Quiz generation: filter, sample, redact

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::db::schemas::Question;
use crate::db::QuestionStore;
use crate::quiz::filter::build_filter;
use crate::quiz::redact::redact;
use crate::types::Result;

/// Size used when a request asks for zero or fewer questions
pub const DEFAULT_QUIZ_SIZE: usize = 10;

/// Body of `POST /quiz/generate`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateQuizRequest {
    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub chapters: Vec<String>,

    #[serde(default, alias = "difficultyStart")]
    pub difficulty_start: Option<String>,

    #[serde(default, alias = "difficultyEnd")]
    pub difficulty_end: Option<String>,

    #[serde(default)]
    pub limit: i64,
}

/// Builds randomized, answer-free quizzes
#[derive(Clone)]
pub struct QuizGenerator {
    store: Arc<dyn QuestionStore>,
    default_size: usize,
}

impl QuizGenerator {
    pub fn new(store: Arc<dyn QuestionStore>, default_size: usize) -> Self {
        Self {
            store,
            default_size: default_size.max(1),
        }
    }

    /// Requested size, or the default when the request gives none
    pub fn effective_limit(&self, requested: i64) -> usize {
        if requested <= 0 {
            self.default_size
        } else {
            usize::try_from(requested).unwrap_or(usize::MAX)
        }
    }

    /// Draw up to `limit` matching questions without replacement.
    ///
    /// Fewer matches than requested returns all of them; none returns an
    /// empty list.
    pub async fn generate(&self, request: &GenerateQuizRequest) -> Result<Vec<Question>> {
        let filter = build_filter(
            &request.subject,
            &request.chapters,
            request.difficulty_start.as_deref(),
            request.difficulty_end.as_deref(),
        )?;
        let limit = self.effective_limit(request.limit);
        debug!(?filter, limit, "Generating quiz");

        let sample = self.store.sample_by_filter(&filter, limit).await?;
        info!(
            subject = %request.subject,
            requested = limit,
            drawn = sample.len(),
            "Quiz generated"
        );

        Ok(redact(sample))
    }
}
