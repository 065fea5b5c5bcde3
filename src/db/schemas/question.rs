//! Question document schema
//!
//! Schema-on-read: the fields the quiz logic inspects are typed, everything
//! else a document carries survives in the flattened `extra` maps so that
//! reads and partial updates never drop data.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::str::FromStr;

use crate::db::mongo::IntoIndexes;
use crate::quiz::Answer;
use crate::types::QuizwayError;

/// Question kind; decides the shape of `structure` and `validation.answer`
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    SingleChoice,
    MultipleChoice,
    TrueFalse,
    FillBlank,
    ShortAnswer,
}

impl QuestionType {
    pub const ALL: [QuestionType; 5] = [
        QuestionType::SingleChoice,
        QuestionType::MultipleChoice,
        QuestionType::TrueFalse,
        QuestionType::FillBlank,
        QuestionType::ShortAnswer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleChoice => "single_choice",
            Self::MultipleChoice => "multiple_choice",
            Self::TrueFalse => "true_false",
            Self::FillBlank => "fill_blank",
            Self::ShortAnswer => "short_answer",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = QuizwayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| QuizwayError::Validation(format!("Unknown question type: {s}")))
    }
}

/// `meta.chapter` is either one chapter name or several
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Chapter {
    One(String),
    Many(Vec<String>),
}

impl Chapter {
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::One(name) => vec![name.as_str()],
            Self::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// Question metadata
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct QuestionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<Chapter>,

    /// Ordinal difficulty code ("A".."E"); compared as a string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Points awarded; integer or float depending on the source data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<serde_json::Number>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl QuestionMeta {
    pub fn chapter_names(&self) -> Vec<&str> {
        self.chapter.as_ref().map(Chapter::names).unwrap_or_default()
    }
}

/// Rich content block, used for the stem and for explanations
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct QuestionContent {
    #[serde(default)]
    pub text: String,

    /// Base64 data URI or URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_image: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl QuestionContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Selectable option for choice and true/false questions
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ChoiceOption {
    /// Option id: "A", "B", "T", "F", ...
    pub id: String,

    #[serde(default)]
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Blank slot for fill-blank questions
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Blank {
    /// Blank id: "b1", "b2", ...
    pub id: String,

    #[serde(default)]
    pub placeholder: String,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Type-dependent layout of the question
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct QuestionStructure {
    /// vertical / horizontal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blanks: Vec<Blank>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Answer key and explanation; never sent to quiz takers
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct QuestionValidation {
    #[serde(default)]
    pub answer: Option<Answer>,

    #[serde(default)]
    pub explanation: QuestionContent,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Question document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Question {
    /// Store-assigned primary key
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub record_key: Option<ObjectId>,

    /// Human-assigned code, e.g. "Q_001"
    #[serde(default)]
    pub id: String,

    /// Hex copy of the record key, unique; used to match re-imports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: QuestionType,

    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub meta: QuestionMeta,

    #[serde(default)]
    pub content: QuestionContent,

    #[serde(default)]
    pub structure: QuestionStructure,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<QuestionValidation>,
}

/// Fields a client may never write; the store owns them
pub const STORE_OWNED_FIELDS: [&str; 2] = ["_id", "uuid"];

impl Question {
    /// Build a question from an API body, dropping store-owned identifiers
    pub fn from_client_json(value: JsonValue) -> Result<Self, QuizwayError> {
        let JsonValue::Object(mut fields) = value else {
            return Err(QuizwayError::Validation(
                "Question body must be a JSON object".to_string(),
            ));
        };
        for field in STORE_OWNED_FIELDS {
            fields.remove(field);
        }
        let question: Question = serde_json::from_value(JsonValue::Object(fields))?;
        Ok(question)
    }

    /// JSON shape served over HTTP: the record key is rendered as hex
    pub fn to_json(&self) -> JsonValue {
        let mut value = serde_json::to_value(self).unwrap_or(JsonValue::Null);
        if let (Some(fields), Some(key)) = (value.as_object_mut(), self.record_key) {
            fields.insert("_id".to_string(), JsonValue::String(key.to_hex()));
        }
        value
    }

    /// Convert to a BSON document
    pub fn to_document(&self) -> Result<Document, QuizwayError> {
        Ok(bson::to_document(self)?)
    }

    /// Decode a BSON document
    pub fn from_document(document: Document) -> Result<Self, QuizwayError> {
        Ok(bson::from_document(document)?)
    }
}

impl IntoIndexes for Question {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Unique index on uuid for re-import deduplication
            (
                doc! { "uuid": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .sparse(true)
                        .name("uuid_unique".to_string())
                        .build(),
                ),
            ),
            // Secondary lookups by human code
            (
                doc! { "id": 1 },
                Some(IndexOptions::builder().name("id_index".to_string()).build()),
            ),
            // Subject is the partition key for quiz generation
            (
                doc! { "subject": 1 },
                Some(
                    IndexOptions::builder()
                        .name("subject_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}
