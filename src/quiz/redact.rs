//! Answer redaction for quiz payloads

use crate::db::schemas::Question;

/// Clear the answer key and explanation from every question.
///
/// Applied to everything the quiz generator returns. Lookups by id and the
/// explanation endpoint serve review contexts and skip it.
pub fn redact(questions: Vec<Question>) -> Vec<Question> {
    questions
        .into_iter()
        .map(|mut question| {
            question.validation = None;
            question
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{QuestionContent, QuestionValidation};

    #[test]
    fn test_redact_clears_validation_only() {
        let question = Question {
            id: "Q_001".to_string(),
            subject: "math".to_string(),
            content: QuestionContent::text("1 + 1 = ?"),
            validation: Some(QuestionValidation {
                answer: Some("B".into()),
                explanation: QuestionContent::text("two"),
                ..Default::default()
            }),
            ..Default::default()
        };

        let redacted = redact(vec![question.clone(), Question::default()]);
        assert_eq!(redacted.len(), 2);
        assert!(redacted.iter().all(|q| q.validation.is_none()));
        assert_eq!(redacted[0].content, question.content);
        assert!(!redacted[0].to_json().as_object().unwrap().contains_key("validation"));
    }
}
