use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::GapQuizId;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur while interpreting question data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuestionError {
    #[error("unknown question kind: {0}")]
    UnknownKind(String),

    #[error("unknown question source: {0}")]
    UnknownSource(String),
}

//
// ─── QUESTION KIND ────────────────────────────────────────────────────────────
//

/// Question formats supported by gap quizzes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Multiple choice with lettered options (`"A) …"`).
    Mcq,
    /// A statement judged true or false.
    TrueFalse,
}

impl QuestionKind {
    /// Parses the stored string form (`"mcq"` / `"true_false"`).
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::UnknownKind` for any other value.
    pub fn parse(value: &str) -> Result<Self, QuestionError> {
        match value {
            "mcq" => Ok(Self::Mcq),
            "true_false" => Ok(Self::TrueFalse),
            other => Err(QuestionError::UnknownKind(other.to_owned())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mcq => "mcq",
            Self::TrueFalse => "true_false",
        }
    }
}

//
// ─── QUESTION SOURCE ──────────────────────────────────────────────────────────
//

/// Where a gap-quiz question came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    /// Verbatim retry of a question the learner previously got wrong.
    WrongAnswer,
    /// Newly generated question targeting a weak concept.
    Extra,
}

impl QuestionSource {
    /// Parses the stored string form (`"wrong_answer"` / `"extra"`).
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::UnknownSource` for any other value.
    pub fn parse(value: &str) -> Result<Self, QuestionError> {
        match value {
            "wrong_answer" => Ok(Self::WrongAnswer),
            "extra" => Ok(Self::Extra),
            other => Err(QuestionError::UnknownSource(other.to_owned())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WrongAnswer => "wrong_answer",
            Self::Extra => "extra",
        }
    }
}

//
// ─── ANSWER CANONICALIZATION ──────────────────────────────────────────────────
//

/// Collapses an answer to its canonical comparison form.
///
/// Multiple-choice answers reduce to the leading option letter
/// (`"a) Planning"` becomes `"A"`); true/false answers reduce to the
/// lowercase `"true"`/`"false"` string form.
#[must_use]
pub fn canonical_answer(kind: QuestionKind, raw: &str) -> String {
    let trimmed = raw.trim();
    match kind {
        QuestionKind::Mcq => trimmed
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase().to_string())
            .unwrap_or_default(),
        QuestionKind::TrueFalse => trimmed.to_ascii_lowercase(),
    }
}

//
// ─── GAP QUIZ QUESTION ────────────────────────────────────────────────────────
//

/// A single question inside a stored gap quiz.
///
/// Immutable once the owning quiz is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapQuizQuestion {
    pub id: String,
    pub kind: QuestionKind,
    pub question_text: String,
    /// Lettered options; present for MCQ only.
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
    pub explanation: String,
    pub hint: Option<String>,
    pub source: QuestionSource,
    pub source_chapter: u32,
    pub target_concept: Option<String>,
}

impl GapQuizQuestion {
    /// Exact-value answer check in canonical form.
    #[must_use]
    pub fn is_correct(&self, selected: &str) -> bool {
        canonical_answer(self.kind, selected) == canonical_answer(self.kind, &self.correct_answer)
    }
}

//
// ─── GAP QUIZ ─────────────────────────────────────────────────────────────────
//

/// A composed gap quiz: review questions first, then generated extras.
///
/// Uniquely identified by `(course_slug, weak_areas_key, include_hints)`
/// and never mutated after being stored; presentation-time shuffling
/// happens in the quiz session, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapQuiz {
    pub id: GapQuizId,
    pub course_slug: String,
    pub weak_areas_key: String,
    pub include_hints: bool,
    pub questions: Vec<GapQuizQuestion>,
    pub created_at: DateTime<Utc>,
}

impl GapQuiz {
    /// Total number of questions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Number of verbatim wrong-answer retries.
    #[must_use]
    pub fn review_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| q.source == QuestionSource::WrongAnswer)
            .count()
    }

    /// Number of generated extra questions.
    #[must_use]
    pub fn extra_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| q.source == QuestionSource::Extra)
            .count()
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//
