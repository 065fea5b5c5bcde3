//! End-to-end quiz flow against the in-memory store
//!
//! Covers the generation and grading guarantees without MongoDB: sampling
//! bounds, redaction, range normalization and answer comparison.

use std::collections::HashSet;
use std::sync::Arc;

use quizway::db::schemas::{Question, QuestionType};
use quizway::db::{MemoryQuestionStore, QuestionRef, QuestionStore};
use quizway::quiz::{
    build_filter, Answer, AnswerValidator, GenerateQuizRequest, QuizGenerator,
};
use quizway::QuizwayError;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

/// Load a small bank covering every question type
async fn seeded_store() -> Arc<MemoryQuestionStore> {
    let store = Arc::new(MemoryQuestionStore::new());
    let bank = json!([
        {"id": "M_001", "type": "single_choice", "subject": "math",
         "meta": {"chapter": "Linear Algebra", "difficulty": "A", "tags": ["matrix"]},
         "content": {"text": "det(I) = ?"},
         "structure": {"options": [{"id": "A", "text": "0"}, {"id": "B", "text": "1"}]},
         "validation": {"answer": "B", "explanation": {"text": "identity"}}},
        {"id": "M_002", "type": "multiple_choice", "subject": "math",
         "meta": {"chapter": ["Number Theory", "Primes"], "difficulty": "B"},
         "structure": {"options": [{"id": "A", "text": "2"}, {"id": "B", "text": "4"}, {"id": "C", "text": "7"}]},
         "validation": {"answer": ["A", "C"], "explanation": {"text": "2 and 7"}}},
        {"id": "M_003", "type": "fill_blank", "subject": "math",
         "meta": {"chapter": "Calculus", "difficulty": "C"},
         "structure": {"blanks": [{"id": "b1", "placeholder": "value"}]},
         "validation": {"answer": {"b1": 0}, "explanation": {"text": "limit"}}},
        {"id": "M_004", "type": "true_false", "subject": "math",
         "meta": {"chapter": "Calculus", "difficulty": "D"},
         "validation": {"answer": "T"}},
        {"id": "M_005", "type": "short_answer", "subject": "math",
         "meta": {"chapter": "Linear algebra basics", "difficulty": "E"}},
        {"id": "P_001", "type": "single_choice", "subject": "physics",
         "meta": {"chapter": "Optics", "difficulty": "B"},
         "validation": {"answer": "A"}}
    ]);

    for item in bank.as_array().unwrap() {
        let question = Question::from_client_json(item.clone()).unwrap();
        store.insert(question).await.unwrap();
    }
    store
}

fn answer(value: serde_json::Value) -> Answer {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_generated_quiz_never_contains_answers() {
    let store = seeded_store().await;
    let generator = QuizGenerator::new(store, 10);

    for (start, end) in [(None, None), (Some("A"), Some("E")), (Some("C"), None)] {
        let quiz = generator
            .generate(&GenerateQuizRequest {
                subject: "math".to_string(),
                difficulty_start: start.map(str::to_string),
                difficulty_end: end.map(str::to_string),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(quiz.iter().all(|q| q.validation.is_none()));
        assert!(quiz.iter().all(|q| q.to_json().get("validation").is_none()));
    }
}

#[tokio::test]
async fn test_sample_size_is_min_of_limit_and_matches() {
    let store = seeded_store().await;
    let generator = QuizGenerator::new(store, 10);

    for limit in [1, 3, 5, 20] {
        let quiz = generator
            .generate(&GenerateQuizRequest {
                subject: "math".to_string(),
                limit,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(quiz.len(), (limit as usize).min(5));

        let distinct: HashSet<_> = quiz.iter().map(|q| q.id.clone()).collect();
        assert_eq!(distinct.len(), quiz.len());
        assert!(quiz.iter().all(|q| q.subject == "math"));
    }
}

#[tokio::test]
async fn test_reversed_range_selects_same_questions() {
    let store = seeded_store().await;

    let forward = build_filter("math", &[], Some("A"), Some("C")).unwrap();
    let reversed = build_filter("math", &[], Some("C"), Some("A")).unwrap();

    let mut a: Vec<String> = store
        .list_by_filter(&forward)
        .await
        .unwrap()
        .into_iter()
        .map(|q| q.id)
        .collect();
    let mut b: Vec<String> = store
        .list_by_filter(&reversed)
        .await
        .unwrap()
        .into_iter()
        .map(|q| q.id)
        .collect();
    a.sort();
    b.sort();
    assert_eq!(a, vec!["M_001", "M_002", "M_003"]);
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_single_bound_is_exact_difficulty() {
    let store = seeded_store().await;
    let filter = build_filter("math", &[], Some("B"), Some("")).unwrap();
    let found = store.list_by_filter(&filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "M_002");
}

#[tokio::test]
async fn test_chapter_keywords_match_substrings() {
    let store = seeded_store().await;
    let filter = build_filter(
        "math",
        &["linear algebra".to_string(), "  ".to_string(), "primes".to_string()],
        None,
        None,
    )
    .unwrap();

    let mut ids: Vec<String> = store
        .list_by_filter(&filter)
        .await
        .unwrap()
        .into_iter()
        .map(|q| q.id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["M_001", "M_002", "M_005"]);
}

#[tokio::test]
async fn test_grading_per_question_type() {
    let store = seeded_store().await;
    let validator = AnswerValidator::new(store);

    let verdict = assert_ok!(validator.validate("M_001", &answer(json!("B"))).await);
    assert!(verdict.correct);
    assert_eq!(verdict.explanation.text, "identity");

    let verdict = assert_ok!(validator.validate("M_001", &answer(json!("A"))).await);
    assert!(!verdict.correct);

    let verdict = assert_ok!(validator.validate("M_002", &answer(json!(["C", "A"]))).await);
    assert!(verdict.correct);

    let verdict = assert_ok!(validator.validate("M_003", &answer(json!({"b1": 0.0}))).await);
    assert!(verdict.correct);

    let verdict = assert_ok!(validator.validate("M_004", &answer(json!("F"))).await);
    assert!(!verdict.correct);
    assert_eq!(verdict.standard_answer, answer(json!("T")));
}

#[tokio::test]
async fn test_missing_answer_key_is_never_correct() {
    let store = seeded_store().await;
    let validator = AnswerValidator::new(store);

    let err = assert_err!(validator.validate("M_005", &answer(json!("anything"))).await);
    assert!(matches!(err, QuizwayError::DataIntegrity(_)));
}

#[tokio::test]
async fn test_identifier_fallback() {
    let store = seeded_store().await;

    let by_code = store
        .find_by_id(&QuestionRef::parse("P_001").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_code.kind, QuestionType::SingleChoice);

    let key = by_code.record_key.unwrap();
    let by_key = store
        .find_by_id(&QuestionRef::parse(&key.to_hex()).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_key.id, "P_001");

    let absent = bson::oid::ObjectId::new().to_hex();
    let validator = AnswerValidator::new(store);
    let err = assert_err!(validator.validate(&absent, &answer(json!("A"))).await);
    assert!(matches!(err, QuizwayError::NotFound(_)));
}
