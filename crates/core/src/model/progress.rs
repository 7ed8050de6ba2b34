use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::quiz::QuestionKind;

/// Errors raised when progress input fails validation.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("chapter number must be at least 1")]
    ZeroChapterNumber,

    #[error("score {0} is outside [0.0, 1.0]")]
    ScoreOutOfRange(f64),
}

/// A single answered question from a completed chapter quiz.
///
/// Carries the full question payload so wrong answers can be replayed
/// verbatim in a gap quiz without regeneration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterAnswer {
    pub question_id: String,
    pub kind: QuestionKind,
    pub question_text: String,
    pub options: Option<Vec<String>>,
    pub user_answer: String,
    pub correct_answer: String,
    pub explanation: String,
    pub is_correct: bool,
}

/// One chapter's quiz outcome for a (user, course).
///
/// Owned by the progress-tracking collaborator; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub chapter_number: u32,
    pub chapter_title: String,
    pub score: f64,
    pub answers: Vec<ChapterAnswer>,
}

impl ProgressRecord {
    /// Checks the invariants the analyzer relies on.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if the chapter number is zero or the score
    /// falls outside `[0.0, 1.0]`.
    pub fn validate(&self) -> Result<(), ProgressError> {
        if self.chapter_number == 0 {
            return Err(ProgressError::ZeroChapterNumber);
        }
        if !(0.0..=1.0).contains(&self.score) {
            return Err(ProgressError::ScoreOutOfRange(self.score));
        }
        Ok(())
    }

    /// Number of wrong answers recorded for this chapter.
    #[must_use]
    pub fn wrong_count(&self) -> usize {
        self.answers.iter().filter(|a| !a.is_correct).count()
    }

    /// True when the learner actually answered something here.
    ///
    /// Records without answers are skipped by the analyzer entirely.
    #[must_use]
    pub fn has_answers(&self) -> bool {
        !self.answers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(is_correct: bool) -> ChapterAnswer {
        ChapterAnswer {
            question_id: "mcq_1".into(),
            kind: QuestionKind::Mcq,
            question_text: "Q".into(),
            options: Some(vec!["A) yes".into(), "B) no".into()]),
            user_answer: if is_correct { "A".into() } else { "B".into() },
            correct_answer: "A".into(),
            explanation: "A is right.".into(),
            is_correct,
        }
    }

    fn record(chapter_number: u32, score: f64) -> ProgressRecord {
        ProgressRecord {
            chapter_number,
            chapter_title: "Intro".into(),
            score,
            answers: vec![answer(true), answer(false), answer(false)],
        }
    }

    #[test]
    fn valid_record_passes() {
        record(1, 0.5).validate().unwrap();
        record(3, 0.0).validate().unwrap();
        record(3, 1.0).validate().unwrap();
    }

    #[test]
    fn zero_chapter_is_rejected() {
        let err = record(0, 0.5).validate().unwrap_err();
        assert!(matches!(err, ProgressError::ZeroChapterNumber));
    }

    #[test]
    fn out_of_range_score_is_rejected() {
        assert!(record(1, -0.1).validate().is_err());
        assert!(record(1, 1.1).validate().is_err());
        assert!(record(1, f64::NAN).validate().is_err());
    }

    #[test]
    fn wrong_count_counts_incorrect_answers() {
        assert_eq!(record(1, 0.5).wrong_count(), 2);
        let empty = ProgressRecord {
            chapter_number: 2,
            chapter_title: "Empty".into(),
            score: 0.0,
            answers: Vec::new(),
        };
        assert_eq!(empty.wrong_count(), 0);
        assert!(!empty.has_answers());
    }
}
