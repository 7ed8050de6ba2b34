use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::{
    CourseOutline, MentorAnalysis, MentorStatus, ProgressError, ProgressRecord, WeakArea,
    WeakConcept,
};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum AnalyzerError {
    #[error("chapter {chapter}: {source}")]
    InvalidRecord {
        chapter: u32,
        #[source]
        source: ProgressError,
    },

    #[error("weak score threshold {0} is outside [0.0, 1.0]")]
    InvalidThreshold(f64),
}

//
// ─── CONFIG ───────────────────────────────────────────────────────────────────
//

/// Thresholds controlling mentor availability and weakness detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerConfig {
    chapters_threshold: u32,
    weak_score_threshold: f64,
}

impl AnalyzerConfig {
    pub const DEFAULT_CHAPTERS_THRESHOLD: u32 = 2;
    pub const DEFAULT_WEAK_SCORE_THRESHOLD: f64 = 0.7;

    /// Creates a config with explicit thresholds.
    ///
    /// # Errors
    ///
    /// Returns `AnalyzerError::InvalidThreshold` if the weak-score
    /// threshold falls outside `[0.0, 1.0]`.
    pub fn new(chapters_threshold: u32, weak_score_threshold: f64) -> Result<Self, AnalyzerError> {
        if !(0.0..=1.0).contains(&weak_score_threshold) {
            return Err(AnalyzerError::InvalidThreshold(weak_score_threshold));
        }
        Ok(Self {
            chapters_threshold,
            weak_score_threshold,
        })
    }

    /// Chapters a learner must complete before the mentor unlocks.
    #[must_use]
    pub fn chapters_threshold(&self) -> u32 {
        self.chapters_threshold
    }

    /// A chapter scoring strictly below this is a weak area.
    #[must_use]
    pub fn weak_score_threshold(&self) -> f64 {
        self.weak_score_threshold
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            chapters_threshold: Self::DEFAULT_CHAPTERS_THRESHOLD,
            weak_score_threshold: Self::DEFAULT_WEAK_SCORE_THRESHOLD,
        }
    }
}

//
// ─── CONCEPT MATCHING ─────────────────────────────────────────────────────────
//

/// Sentinel concept for wrong answers that match no known key concept.
pub const GENERAL_CONCEPT: &str = "general";

const MAX_SAMPLE_QUESTIONS: usize = 3;

/// Picks the key concept a question belongs to: the first key concept
/// contained in the question text, case-insensitively.
///
/// Keyword matching is a heuristic and can misclassify; it stays behind
/// this single pure function so it can be swapped for something smarter
/// without touching the analyzer's control flow.
#[must_use]
pub fn match_concept<'a>(question_text: &str, key_concepts: &'a [String]) -> Option<&'a str> {
    let text = question_text.to_lowercase();
    key_concepts
        .iter()
        .find(|concept| !concept.is_empty() && text.contains(&concept.to_lowercase()))
        .map(String::as_str)
}

//
// ─── ANALYZER ─────────────────────────────────────────────────────────────────
//

/// Pure weak-area analysis over a learner's progress history.
///
/// Stateless and synchronous; safe to call concurrently. Every call
/// recomputes the analysis from the records it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeakAreaAnalyzer {
    config: AnalyzerConfig,
}

impl WeakAreaAnalyzer {
    #[must_use]
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> AnalyzerConfig {
        self.config
    }

    /// Whether the mentor unlocks at the given completion count.
    #[must_use]
    pub fn mentor_available(&self, chapters_completed: u32) -> bool {
        chapters_completed >= self.config.chapters_threshold
    }

    /// Full analysis: completion, average score, weak areas with concepts.
    ///
    /// Records with no answers are skipped entirely: they count neither
    /// toward completion nor toward the score mean, and can never be weak.
    /// Weak areas come out ascending by chapter number.
    ///
    /// # Errors
    ///
    /// Returns `AnalyzerError::InvalidRecord` for malformed input; no
    /// partial analysis is produced.
    pub fn analyze(
        &self,
        course: &CourseOutline,
        records: &[ProgressRecord],
    ) -> Result<MentorAnalysis, AnalyzerError> {
        let completed = self.completed_records(records)?;

        let total_chapters_completed = u32::try_from(completed.len()).unwrap_or(u32::MAX);
        let average_score = average_score(&completed);
        let total_wrong_answers = completed
            .values()
            .map(|record| u32::try_from(record.wrong_count()).unwrap_or(u32::MAX))
            .sum();

        // BTreeMap iteration gives the ascending chapter order the cache
        // key derivation relies on.
        let mut weak_areas = Vec::new();
        for (number, record) in &completed {
            if record.score >= self.config.weak_score_threshold {
                continue;
            }
            let key_concepts = course
                .chapter(*number)
                .map_or(&[] as &[String], |chapter| chapter.key_concepts.as_slice());
            weak_areas.push(WeakArea {
                chapter_number: *number,
                chapter_title: record.chapter_title.clone(),
                score: record.score,
                weak_concepts: weak_concepts_for(record, key_concepts),
            });
        }

        Ok(MentorAnalysis {
            course_slug: course.slug.clone(),
            course_topic: course.topic.clone(),
            difficulty: course.difficulty.clone(),
            total_chapters_completed,
            average_score,
            weak_areas,
            total_wrong_answers,
            mentor_available: self.mentor_available(total_chapters_completed),
        })
    }

    /// Availability probe without building per-concept detail.
    ///
    /// # Errors
    ///
    /// Returns `AnalyzerError::InvalidRecord` for malformed input.
    pub fn status(&self, records: &[ProgressRecord]) -> Result<MentorStatus, AnalyzerError> {
        let completed = self.completed_records(records)?;

        let chapters_completed = u32::try_from(completed.len()).unwrap_or(u32::MAX);
        let weak_areas_count = completed
            .values()
            .filter(|record| record.score < self.config.weak_score_threshold)
            .count();

        Ok(MentorStatus {
            mentor_available: self.mentor_available(chapters_completed),
            chapters_completed,
            chapters_required: self.config.chapters_threshold,
            average_score: average_score(&completed),
            weak_areas_count: u32::try_from(weak_areas_count).unwrap_or(u32::MAX),
            total_wrong_answers: completed
                .values()
                .map(|record| u32::try_from(record.wrong_count()).unwrap_or(u32::MAX))
                .sum(),
        })
    }

    /// Validates all records and keeps the completed ones, keyed by
    /// chapter. The last record for a chapter wins.
    fn completed_records<'a>(
        &self,
        records: &'a [ProgressRecord],
    ) -> Result<BTreeMap<u32, &'a ProgressRecord>, AnalyzerError> {
        let mut by_chapter = BTreeMap::new();
        for record in records {
            record
                .validate()
                .map_err(|source| AnalyzerError::InvalidRecord {
                    chapter: record.chapter_number,
                    source,
                })?;
            if !record.has_answers() {
                continue;
            }
            by_chapter.insert(record.chapter_number, record);
        }
        Ok(by_chapter)
    }
}

fn average_score(completed: &BTreeMap<u32, &ProgressRecord>) -> f64 {
    if completed.is_empty() {
        return 0.0;
    }
    let sum: f64 = completed.values().map(|record| record.score).sum();
    sum / completed.len() as f64
}

/// Groups a weak chapter's answers by concept; concept groups that saw at
/// least one wrong answer become `WeakConcept`s, ordered by wrong count
/// descending, then name.
fn weak_concepts_for(record: &ProgressRecord, key_concepts: &[String]) -> Vec<WeakConcept> {
    #[derive(Default)]
    struct Group {
        wrong: u32,
        total: u32,
        samples: Vec<String>,
    }

    let mut groups: BTreeMap<&str, Group> = BTreeMap::new();
    for answer in &record.answers {
        let concept = match_concept(&answer.question_text, key_concepts).unwrap_or(GENERAL_CONCEPT);
        let group = groups.entry(concept).or_default();
        group.total += 1;
        if !answer.is_correct {
            group.wrong += 1;
            if group.samples.len() < MAX_SAMPLE_QUESTIONS {
                group.samples.push(answer.question_text.clone());
            }
        }
    }

    let mut concepts: Vec<WeakConcept> = groups
        .into_iter()
        .filter(|(_, group)| group.wrong > 0)
        .map(|(concept, group)| WeakConcept {
            concept: concept.to_owned(),
            wrong_count: group.wrong,
            total_questions: group.total,
            sample_wrong_questions: group.samples,
        })
        .collect();
    concepts.sort_by(|a, b| {
        b.wrong_count
            .cmp(&a.wrong_count)
            .then_with(|| a.concept.cmp(&b.concept))
    });
    concepts
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//
