//! Polymorphic answers and per-type grading
//!
//! Stored answers come in three shapes: a single scalar (option id, free
//! text, number or flag), a list of scalars (multi-select), or a map keyed by
//! blank id (fill-blank). The question type decides how two answers are
//! compared.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::db::schemas::QuestionType;

/// Leaf value of an answer
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum AnswerScalar {
    Flag(bool),
    Number(serde_json::Number),
    Text(String),
}

/// Answer as stored in `validation.answer` or submitted by a client
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Answer {
    Scalar(AnswerScalar),
    List(Vec<AnswerScalar>),
    Map(BTreeMap<String, Answer>),
}

impl From<&str> for Answer {
    fn from(value: &str) -> Self {
        Answer::Scalar(AnswerScalar::Text(value.to_string()))
    }
}

impl From<Vec<&str>> for Answer {
    fn from(values: Vec<&str>) -> Self {
        Answer::List(
            values
                .into_iter()
                .map(|v| AnswerScalar::Text(v.to_string()))
                .collect(),
        )
    }
}

impl Answer {
    /// Blank text, an empty list or an empty map.
    ///
    /// Import tooling writes these as placeholders when a question has no
    /// answer key, so they never count as a real answer.
    pub fn is_blank(&self) -> bool {
        match self {
            Answer::Scalar(AnswerScalar::Text(text)) => text.trim().is_empty(),
            Answer::Scalar(_) => false,
            Answer::List(values) => values.is_empty(),
            Answer::Map(entries) => entries.is_empty(),
        }
    }
}

/// Comparable form of a scalar.
///
/// Numbers that hold an integral value collapse to `Int`, so `1` and `1.0`
/// from different client serializers compare equal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum ScalarKey {
    Flag(bool),
    Int(i64),
    Float(u64),
    Text(String),
}

impl From<&AnswerScalar> for ScalarKey {
    fn from(scalar: &AnswerScalar) -> Self {
        match scalar {
            AnswerScalar::Flag(b) => ScalarKey::Flag(*b),
            AnswerScalar::Text(s) => ScalarKey::Text(s.clone()),
            AnswerScalar::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return ScalarKey::Int(i);
                }
                let f = n.as_f64().unwrap_or(f64::NAN);
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                    ScalarKey::Int(f as i64)
                } else {
                    ScalarKey::Float(f.to_bits())
                }
            }
        }
    }
}

fn key_set(values: &[AnswerScalar]) -> BTreeSet<ScalarKey> {
    values.iter().map(ScalarKey::from).collect()
}

/// Elements of a scalar or list answer as a set; `None` for maps
fn as_set(answer: &Answer) -> Option<BTreeSet<ScalarKey>> {
    match answer {
        Answer::Scalar(s) => Some(BTreeSet::from([ScalarKey::from(s)])),
        Answer::List(values) => Some(key_set(values)),
        Answer::Map(_) => None,
    }
}

/// Structural equality. Lists compare as sets when `unordered_lists` is set.
fn equal(standard: &Answer, submitted: &Answer, unordered_lists: bool) -> bool {
    match (standard, submitted) {
        (Answer::Scalar(a), Answer::Scalar(b)) => ScalarKey::from(a) == ScalarKey::from(b),
        (Answer::List(a), Answer::List(b)) => {
            if unordered_lists {
                key_set(a) == key_set(b)
            } else {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| ScalarKey::from(x) == ScalarKey::from(y))
            }
        }
        (Answer::Map(a), Answer::Map(b)) => {
            a.len() == b.len()
                && a.iter().all(|(key, expected)| {
                    b.get(key)
                        .is_some_and(|given| equal(expected, given, unordered_lists))
                })
        }
        _ => false,
    }
}

/// One blank of a fill-blank answer. A stored list holds the accepted
/// alternatives, so a single submitted value only has to be one of them.
fn blank_matches(accepted: &Answer, given: &Answer) -> bool {
    match (accepted, given) {
        (Answer::List(alternatives), Answer::Scalar(value)) => {
            let value = ScalarKey::from(value);
            alternatives.iter().any(|a| ScalarKey::from(a) == value)
        }
        _ => equal(accepted, given, true),
    }
}

/// Decide whether `submitted` matches `standard` for a question of `kind`
pub fn grade(kind: QuestionType, standard: &Answer, submitted: &Answer) -> bool {
    match kind {
        QuestionType::MultipleChoice => match (as_set(standard), as_set(submitted)) {
            (Some(expected), Some(given)) => expected == given,
            _ => equal(standard, submitted, true),
        },
        QuestionType::FillBlank => match (standard, submitted) {
            (Answer::Map(expected), Answer::Map(given)) => {
                expected.len() == given.len()
                    && expected.iter().all(|(blank, accepted)| {
                        given
                            .get(blank)
                            .is_some_and(|value| blank_matches(accepted, value))
                    })
            }
            _ => equal(standard, submitted, true),
        },
        QuestionType::SingleChoice | QuestionType::TrueFalse | QuestionType::ShortAnswer => {
            equal(standard, submitted, false)
        }
    }
}
