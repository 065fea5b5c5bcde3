//! Answer checking against the stored answer key

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::db::schemas::QuestionContent;
use crate::db::{QuestionRef, QuestionStore};
use crate::quiz::answer::{grade, Answer};
use crate::types::{QuizwayError, Result};

/// Shown when a question carries no explanation
pub const NO_EXPLANATION: &str = "No explanation available";

/// Body of `POST /quiz/validate`
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateAnswerRequest {
    #[serde(default, alias = "questionId")]
    pub question_id: String,

    #[serde(default, alias = "userAnswer")]
    pub user_answer: Option<Answer>,
}

/// Outcome of grading one submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub correct: bool,
    pub standard_answer: Answer,
    pub explanation: QuestionContent,
}

/// Grades submissions; read only
#[derive(Clone)]
pub struct AnswerValidator {
    store: Arc<dyn QuestionStore>,
}

impl AnswerValidator {
    pub fn new(store: Arc<dyn QuestionStore>) -> Self {
        Self { store }
    }

    /// Grade `user_answer` against the question `question_id` refers to.
    ///
    /// The verdict always carries the standard answer and explanation.
    pub async fn validate(&self, question_id: &str, user_answer: &Answer) -> Result<Verdict> {
        let id = QuestionRef::parse(question_id)?;
        let question = self
            .store
            .find_by_id(&id)
            .await?
            .ok_or_else(|| QuizwayError::NotFound(format!("question {id}")))?;

        let validation = question.validation.ok_or_else(|| {
            QuizwayError::DataIntegrity(format!("question {id} has no validation block"))
        })?;
        // Blank placeholders left by import tooling count as a missing key
        let standard_answer = validation
            .answer
            .filter(|answer| !answer.is_blank())
            .ok_or_else(|| {
                QuizwayError::DataIntegrity(format!("question {id} has no answer key"))
            })?;

        let correct = grade(question.kind, &standard_answer, user_answer);
        debug!(question = %id, kind = %question.kind, correct, "Answer graded");

        Ok(Verdict {
            correct,
            standard_answer,
            explanation: validation.explanation,
        })
    }

    /// Explanation for review; a placeholder when the question has none
    pub async fn explanation(&self, question_id: &str) -> Result<QuestionContent> {
        let id = QuestionRef::parse(question_id)?;
        let question = self
            .store
            .find_by_id(&id)
            .await?
            .ok_or_else(|| QuizwayError::NotFound(format!("question {id}")))?;

        Ok(match question.validation {
            Some(validation) => validation.explanation,
            None => QuestionContent::text(NO_EXPLANATION),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{Question, QuestionType, QuestionValidation};
    use crate::db::MemoryQuestionStore;
    use bson::oid::ObjectId;
    use serde_json::json;

    async fn store_with(questions: Vec<Question>) -> Arc<MemoryQuestionStore> {
        let store = Arc::new(MemoryQuestionStore::new());
        for question in questions {
            store.insert(question).await.unwrap();
        }
        store
    }

    fn with_answer(id: &str, kind: QuestionType, answer: Option<Answer>) -> Question {
        Question {
            id: id.to_string(),
            kind,
            subject: "math".to_string(),
            validation: Some(QuestionValidation {
                answer,
                explanation: QuestionContent::text("see chapter 2"),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_validate_scalar() {
        let store = store_with(vec![with_answer(
            "Q_001",
            QuestionType::SingleChoice,
            Some("A".into()),
        )])
        .await;
        let validator = AnswerValidator::new(store);

        let verdict = validator.validate("Q_001", &"A".into()).await.unwrap();
        assert!(verdict.correct);
        assert_eq!(verdict.explanation.text, "see chapter 2");

        let verdict = validator.validate("Q_001", &"B".into()).await.unwrap();
        assert!(!verdict.correct);
        assert_eq!(verdict.standard_answer, Answer::from("A"));
    }

    #[tokio::test]
    async fn test_validate_multi_select_order() {
        let store = store_with(vec![with_answer(
            "Q_002",
            QuestionType::MultipleChoice,
            Some(vec!["A", "C"].into()),
        )])
        .await;
        let validator = AnswerValidator::new(store);

        let verdict = validator
            .validate("Q_002", &vec!["C", "A"].into())
            .await
            .unwrap();
        assert!(verdict.correct);
    }

    #[tokio::test]
    async fn test_missing_answer_is_integrity_error() {
        let mut no_block = with_answer("Q_003", QuestionType::SingleChoice, None);
        no_block.validation = None;
        let store = store_with(vec![
            no_block,
            with_answer("Q_004", QuestionType::SingleChoice, None),
        ])
        .await;
        let validator = AnswerValidator::new(store);

        for id in ["Q_003", "Q_004"] {
            let err = validator.validate(id, &"A".into()).await.unwrap_err();
            assert!(matches!(err, QuizwayError::DataIntegrity(_)));
            assert_eq!(err.status_code().as_u16(), 500);
        }
    }

    #[tokio::test]
    async fn test_blank_answer_key_is_integrity_error() {
        let placeholder = |raw: serde_json::Value| -> Option<Answer> {
            Some(serde_json::from_value(raw).unwrap())
        };
        let store = store_with(vec![
            with_answer("Q_010", QuestionType::SingleChoice, placeholder(json!(""))),
            with_answer("Q_011", QuestionType::MultipleChoice, placeholder(json!([]))),
            with_answer("Q_012", QuestionType::FillBlank, placeholder(json!({}))),
        ])
        .await;
        let validator = AnswerValidator::new(store);

        let submissions = [
            ("Q_010", json!("")),
            ("Q_011", json!([])),
            ("Q_012", json!({})),
        ];
        for (id, submitted) in submissions {
            let submitted: Answer = serde_json::from_value(submitted).unwrap();
            let err = validator.validate(id, &submitted).await.unwrap_err();
            assert!(matches!(err, QuizwayError::DataIntegrity(_)), "{id}: {err:?}");
        }
    }

    #[tokio::test]
    async fn test_fill_blank_single_alternative() {
        let accepted: Answer =
            serde_json::from_value(json!({"b1": ["Paris", "paris"]})).unwrap();
        let store = store_with(vec![with_answer(
            "Q_013",
            QuestionType::FillBlank,
            Some(accepted),
        )])
        .await;
        let validator = AnswerValidator::new(store);

        let submitted: Answer = serde_json::from_value(json!({"b1": "Paris"})).unwrap();
        assert!(validator.validate("Q_013", &submitted).await.unwrap().correct);
    }

    #[tokio::test]
    async fn test_unknown_question_not_found() {
        let validator = AnswerValidator::new(store_with(vec![]).await);
        let missing = ObjectId::new().to_hex();
        let err = validator.validate(&missing, &"A".into()).await.unwrap_err();
        assert!(matches!(err, QuizwayError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_explanation_placeholder() {
        let mut bare = with_answer("Q_005", QuestionType::TrueFalse, None);
        bare.validation = None;
        let store = store_with(vec![bare]).await;
        let validator = AnswerValidator::new(store);

        let explanation = validator.explanation("Q_005").await.unwrap();
        assert_eq!(explanation.text, NO_EXPLANATION);
    }
}
