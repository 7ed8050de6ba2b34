use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::QuestionSource;

//
// ─── BAND POLICY ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BandPolicyError {
    #[error("excellent_min {excellent} must be <= 100 and >= good_min {good}")]
    InvalidThresholds { excellent: u8, good: u8 },
}

/// Score-band thresholds. Overridden together as one policy, never as
/// scattered magic numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandPolicy {
    excellent_min: u8,
    good_min: u8,
}

impl BandPolicy {
    pub const DEFAULT_EXCELLENT_MIN: u8 = 80;
    pub const DEFAULT_GOOD_MIN: u8 = 60;

    /// Creates a policy with explicit thresholds (percent values).
    ///
    /// # Errors
    ///
    /// Returns `BandPolicyError::InvalidThresholds` if `excellent_min`
    /// exceeds 100 or falls below `good_min`.
    pub fn new(excellent_min: u8, good_min: u8) -> Result<Self, BandPolicyError> {
        if excellent_min > 100 || good_min > excellent_min {
            return Err(BandPolicyError::InvalidThresholds {
                excellent: excellent_min,
                good: good_min,
            });
        }
        Ok(Self {
            excellent_min,
            good_min,
        })
    }

    #[must_use]
    pub fn excellent_min(&self) -> u8 {
        self.excellent_min
    }

    #[must_use]
    pub fn good_min(&self) -> u8 {
        self.good_min
    }

    /// Maps a percent score to its band.
    #[must_use]
    pub fn band(&self, percent: u8) -> ScoreBand {
        if percent >= self.excellent_min {
            ScoreBand::Excellent
        } else if percent >= self.good_min {
            ScoreBand::Good
        } else {
            ScoreBand::PracticeMore
        }
    }
}

impl Default for BandPolicy {
    fn default() -> Self {
        Self {
            excellent_min: Self::DEFAULT_EXCELLENT_MIN,
            good_min: Self::DEFAULT_GOOD_MIN,
        }
    }
}

/// Qualitative performance band for a completed quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    PracticeMore,
}

impl ScoreBand {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::PracticeMore => "practice_more",
        }
    }
}

//
// ─── ANSWER RECORD ────────────────────────────────────────────────────────────
//

/// One submitted answer, evaluated once at submission time and never
/// recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub selected: String,
    /// The correct answer, copied from the question at presentation time.
    pub correct: String,
    pub is_correct: bool,
}

//
// ─── RESULTS ──────────────────────────────────────────────────────────────────
//

/// Correct/total counts for one question source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBreakdown {
    pub correct: u32,
    pub total: u32,
}

/// Aggregated outcome of a completed quiz session.
///
/// Invariants: `correct_count == review.correct + extra.correct` and
/// `total == review.total + extra.total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResults {
    total: u32,
    correct_count: u32,
    percent: u8,
    review: SourceBreakdown,
    extra: SourceBreakdown,
    band: ScoreBand,
}

impl QuizResults {
    /// Builds results from per-question `(source, is_correct)` pairs.
    ///
    /// Pure and deterministic. An empty input yields a zero-percent
    /// `PracticeMore` result.
    #[must_use]
    pub fn from_answers<I>(answers: I, policy: BandPolicy) -> Self
    where
        I: IntoIterator<Item = (QuestionSource, bool)>,
    {
        let mut review = SourceBreakdown::default();
        let mut extra = SourceBreakdown::default();
        for (source, is_correct) in answers {
            let slot = match source {
                QuestionSource::WrongAnswer => &mut review,
                QuestionSource::Extra => &mut extra,
            };
            slot.total += 1;
            if is_correct {
                slot.correct += 1;
            }
        }

        let total = review.total + extra.total;
        let correct_count = review.correct + extra.correct;
        let percent = if total == 0 {
            0
        } else {
            // correct_count <= total, so this rounds into 0..=100
            (f64::from(correct_count) / f64::from(total) * 100.0).round() as u8
        };

        Self {
            total,
            correct_count,
            percent,
            review,
            extra,
            band: policy.band(percent),
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn percent(&self) -> u8 {
        self.percent
    }

    #[must_use]
    pub fn band(&self) -> ScoreBand {
        self.band
    }

    /// Breakdown for one question source.
    #[must_use]
    pub fn source(&self, source: QuestionSource) -> SourceBreakdown {
        match source {
            QuestionSource::WrongAnswer => self.review,
            QuestionSource::Extra => self.extra,
        }
    }

    #[must_use]
    pub fn review(&self) -> SourceBreakdown {
        self.review
    }

    #[must_use]
    pub fn extra(&self) -> SourceBreakdown {
        self.extra
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use QuestionSource::{Extra, WrongAnswer};

    #[test]
    fn counts_split_by_source_and_stay_consistent() {
        let results = QuizResults::from_answers(
            vec![
                (WrongAnswer, true),
                (WrongAnswer, false),
                (Extra, true),
                (Extra, true),
            ],
            BandPolicy::default(),
        );

        assert_eq!(results.total(), 4);
        assert_eq!(results.correct_count(), 3);
        assert_eq!(results.review(), SourceBreakdown { correct: 1, total: 2 });
        assert_eq!(results.extra(), SourceBreakdown { correct: 2, total: 2 });
        assert_eq!(
            results.correct_count(),
            results.review().correct + results.extra().correct
        );
        assert_eq!(results.total(), results.review().total + results.extra().total);
        assert_eq!(results.percent(), 75);
        assert_eq!(results.band(), ScoreBand::Good);
    }

    #[test]
    fn percent_rounds_to_nearest() {
        let results = QuizResults::from_answers(
            vec![(WrongAnswer, true), (WrongAnswer, true), (WrongAnswer, false)],
            BandPolicy::default(),
        );
        // 2/3 = 66.66… rounds to 67
        assert_eq!(results.percent(), 67);
    }

    #[test]
    fn band_thresholds_are_inclusive() {
        let policy = BandPolicy::default();
        assert_eq!(policy.band(80), ScoreBand::Excellent);
        assert_eq!(policy.band(79), ScoreBand::Good);
        assert_eq!(policy.band(60), ScoreBand::Good);
        assert_eq!(policy.band(59), ScoreBand::PracticeMore);
    }

    #[test]
    fn custom_policy_moves_bands_together() {
        let policy = BandPolicy::new(90, 50).unwrap();
        assert_eq!(policy.band(85), ScoreBand::Good);
        assert_eq!(policy.band(95), ScoreBand::Excellent);
        assert!(BandPolicy::new(50, 90).is_err());
        assert!(BandPolicy::new(120, 50).is_err());
    }

    #[test]
    fn empty_input_is_total_and_harmless() {
        let results = QuizResults::from_answers(Vec::new(), BandPolicy::default());
        assert_eq!(results.total(), 0);
        assert_eq!(results.percent(), 0);
        assert_eq!(results.band(), ScoreBand::PracticeMore);
    }
}
