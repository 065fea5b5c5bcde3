//! Quiz logic
//!
//! Filter construction, randomized generation, redaction, answer grading and
//! metadata aggregation. Everything here talks to persistence only through
//! `QuestionStore`.

pub mod answer;
pub mod catalog;
pub mod filter;
pub mod generator;
pub mod redact;
pub mod validator;

pub use answer::{grade, Answer, AnswerScalar};
pub use catalog::MetadataCatalog;
pub use filter::{build_filter, DifficultyRange, QuestionFilter};
pub use generator::{GenerateQuizRequest, QuizGenerator, DEFAULT_QUIZ_SIZE};
pub use redact::redact;
pub use validator::{AnswerValidator, ValidateAnswerRequest, Verdict, NO_EXPLANATION};
