//! Question filters
//!
//! A `QuestionFilter` is built once from request parameters and evaluated two
//! ways: rendered to a MongoDB query document, or matched directly against an
//! in-memory `Question` by the memory store.

use bson::{doc, Bson, Document};
use serde::{Deserialize, Serialize};

use crate::db::schemas::{Question, QuestionType};
use crate::types::{QuizwayError, Result};

/// Constraint on `meta.difficulty`; bounds are compared lexicographically
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultyRange {
    Exact(String),
    Between { low: String, high: String },
}

impl DifficultyRange {
    /// Normalize optional bounds.
    ///
    /// Both blank gives no constraint, a single bound is an exact value, and
    /// reversed bounds are swapped.
    pub fn from_bounds(start: Option<&str>, end: Option<&str>) -> Option<Self> {
        let start = start.map(str::trim).filter(|s| !s.is_empty());
        let end = end.map(str::trim).filter(|s| !s.is_empty());

        match (start, end) {
            (None, None) => None,
            (Some(one), None) | (None, Some(one)) => Some(Self::Exact(one.to_string())),
            (Some(a), Some(b)) if a == b => Some(Self::Exact(a.to_string())),
            (Some(a), Some(b)) => {
                let (low, high) = if a > b { (b, a) } else { (a, b) };
                Some(Self::Between {
                    low: low.to_string(),
                    high: high.to_string(),
                })
            }
        }
    }

    fn to_bson(&self) -> Bson {
        match self {
            Self::Exact(value) => Bson::String(value.clone()),
            Self::Between { low, high } => {
                Bson::Document(doc! { "$gte": low.as_str(), "$lte": high.as_str() })
            }
        }
    }

    pub fn contains(&self, difficulty: &str) -> bool {
        match self {
            Self::Exact(value) => difficulty == value,
            Self::Between { low, high } => low.as_str() <= difficulty && difficulty <= high.as_str(),
        }
    }
}

/// Filter over the question collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionFilter {
    pub subject: Option<String>,
    pub kind: Option<QuestionType>,
    pub difficulty: Option<DifficultyRange>,
    /// Case-insensitive literal substrings matched against `meta.chapter`;
    /// any one match is enough
    pub chapters: Vec<String>,
}

impl QuestionFilter {
    /// Filter used by the list endpoint; every parameter is optional
    pub fn for_listing(
        subject: Option<&str>,
        kind: Option<&str>,
        difficulty: Option<&str>,
    ) -> Result<Self> {
        let subject = subject
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let kind = match kind.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(raw.parse::<QuestionType>()?),
            None => None,
        };

        Ok(Self {
            subject,
            kind,
            difficulty: DifficultyRange::from_bounds(difficulty, None),
            chapters: Vec::new(),
        })
    }

    /// Render as a MongoDB query document
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();

        if let Some(subject) = &self.subject {
            filter.insert("subject", subject.as_str());
        }

        if let Some(kind) = &self.kind {
            filter.insert("type", kind.as_str());
        }

        if let Some(range) = &self.difficulty {
            filter.insert("meta.difficulty", range.to_bson());
        }

        if !self.chapters.is_empty() {
            // Matches both string and array-valued chapters
            let clauses: Vec<Bson> = self
                .chapters
                .iter()
                .map(|keyword| {
                    Bson::Document(doc! {
                        "meta.chapter": { "$regex": regex::escape(keyword), "$options": "i" }
                    })
                })
                .collect();
            filter.insert("$or", clauses);
        }

        filter
    }

    /// Evaluate against a question without a database
    pub fn matches(&self, question: &Question) -> bool {
        if let Some(subject) = &self.subject {
            if &question.subject != subject {
                return false;
            }
        }

        if let Some(kind) = self.kind {
            if question.kind != kind {
                return false;
            }
        }

        if let Some(range) = &self.difficulty {
            match question.meta.difficulty.as_deref() {
                Some(difficulty) if range.contains(difficulty) => {}
                _ => return false,
            }
        }

        if !self.chapters.is_empty() {
            let chapters: Vec<String> = question
                .meta
                .chapter_names()
                .into_iter()
                .map(str::to_lowercase)
                .collect();
            let hit = self.chapters.iter().any(|keyword| {
                let keyword = keyword.to_lowercase();
                chapters.iter().any(|chapter| chapter.contains(&keyword))
            });
            if !hit {
                return false;
            }
        }

        true
    }
}

/// Build the quiz-generation filter.
///
/// `subject` is required. Blank chapter keywords are dropped; if none remain
/// no chapter constraint applies.
pub fn build_filter(
    subject: &str,
    chapters: &[String],
    difficulty_start: Option<&str>,
    difficulty_end: Option<&str>,
) -> Result<QuestionFilter> {
    let subject = subject.trim();
    if subject.is_empty() {
        return Err(QuizwayError::Validation("subject is required".to_string()));
    }

    let chapters = chapters
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    Ok(QuestionFilter {
        subject: Some(subject.to_string()),
        kind: None,
        difficulty: DifficultyRange::from_bounds(difficulty_start, difficulty_end),
        chapters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{Chapter, QuestionMeta};

    fn question(subject: &str, difficulty: &str, chapter: Chapter) -> Question {
        Question {
            id: "Q_001".to_string(),
            subject: subject.to_string(),
            meta: QuestionMeta {
                chapter: Some(chapter),
                difficulty: Some(difficulty.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_reversed_range_is_swapped() {
        let forward = build_filter("math", &[], Some("A"), Some("C")).unwrap();
        let reversed = build_filter("math", &[], Some("C"), Some("A")).unwrap();
        assert_eq!(forward, reversed);
        assert_eq!(
            forward.to_document(),
            doc! { "subject": "math", "meta.difficulty": { "$gte": "A", "$lte": "C" } }
        );

        for level in ["A", "B", "C"] {
            assert!(forward.matches(&question("math", level, Chapter::One("x".into()))));
        }
        assert!(!forward.matches(&question("math", "D", Chapter::One("x".into()))));
    }

    #[test]
    fn test_single_bound_is_exact() {
        let filter = build_filter("math", &[], Some("B"), Some("")).unwrap();
        assert_eq!(filter.difficulty, Some(DifficultyRange::Exact("B".into())));
        assert_eq!(filter.to_document().get_str("meta.difficulty").unwrap(), "B");

        let filter = build_filter("math", &[], None, Some("D")).unwrap();
        assert_eq!(filter.difficulty, Some(DifficultyRange::Exact("D".into())));
    }

    #[test]
    fn test_no_bounds_no_constraint() {
        let filter = build_filter("math", &[], Some("  "), None).unwrap();
        assert!(filter.difficulty.is_none());
        assert_eq!(filter.to_document(), doc! { "subject": "math" });
    }

    #[test]
    fn test_subject_required() {
        let err = build_filter("   ", &[], None, None).unwrap_err();
        assert!(matches!(err, QuizwayError::Validation(_)));
    }

    #[test]
    fn test_chapter_keywords_are_literal() {
        let filter = build_filter(
            "math",
            &["".to_string(), "1.2 (a+b)".to_string()],
            None,
            None,
        )
        .unwrap();
        assert_eq!(filter.chapters, vec!["1.2 (a+b)".to_string()]);

        let document = filter.to_document();
        let clauses = document.get_array("$or").unwrap();
        assert_eq!(clauses.len(), 1);
        let clause = clauses[0].as_document().unwrap();
        let chapter = clause.get_document("meta.chapter").unwrap();
        assert_eq!(chapter.get_str("$regex").unwrap(), r"1\.2 \(a\+b\)");
        assert_eq!(chapter.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn test_blank_keywords_drop_constraint() {
        let filter = build_filter("math", &[" ".to_string()], None, None).unwrap();
        assert!(filter.chapters.is_empty());
        assert!(!filter.to_document().contains_key("$or"));
    }

    #[test]
    fn test_chapter_match_is_case_insensitive_substring() {
        let filter = build_filter("math", &["ALGEBRA".to_string()], None, None).unwrap();
        assert!(filter.matches(&question("math", "A", Chapter::One("Linear algebra".into()))));
        assert!(filter.matches(&question(
            "math",
            "A",
            Chapter::Many(vec!["Geometry".into(), "algebra basics".into()])
        )));
        assert!(!filter.matches(&question("math", "A", Chapter::One("Geometry".into()))));
        assert!(!filter.matches(&question("physics", "A", Chapter::One("algebra".into()))));
    }

    #[test]
    fn test_listing_filter() {
        let filter = QuestionFilter::for_listing(Some("math"), Some("true_false"), Some("C")).unwrap();
        assert_eq!(
            filter.to_document(),
            doc! { "subject": "math", "type": "true_false", "meta.difficulty": "C" }
        );

        assert!(QuestionFilter::for_listing(None, Some("essay"), None).is_err());
        assert!(QuestionFilter::for_listing(None, None, None)
            .unwrap()
            .to_document()
            .is_empty());
    }
}
