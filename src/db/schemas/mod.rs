//! MongoDB document schemas

pub mod question;

pub use question::{
    Blank, Chapter, ChoiceOption, Question, QuestionContent, QuestionMeta, QuestionStructure,
    QuestionType, QuestionValidation, STORE_OWNED_FIELDS,
};
