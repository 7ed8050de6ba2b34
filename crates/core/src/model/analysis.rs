use serde::{Deserialize, Serialize};

/// A specific topic within a weak chapter tied to one or more wrong answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeakConcept {
    pub concept: String,
    pub wrong_count: u32,
    /// All answers (right and wrong) that referenced this concept.
    pub total_questions: u32,
    /// Up to three wrong question texts, in original answer order.
    pub sample_wrong_questions: Vec<String>,
}

/// A chapter whose score fell below the configured threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeakArea {
    pub chapter_number: u32,
    pub chapter_title: String,
    pub score: f64,
    pub weak_concepts: Vec<WeakConcept>,
}

/// Complete weak-area analysis for one (user, course).
///
/// Ephemeral: recomputed on every request. The progress history is the
/// source of truth, never this value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorAnalysis {
    pub course_slug: String,
    pub course_topic: String,
    pub difficulty: String,
    pub total_chapters_completed: u32,
    pub average_score: f64,
    /// Ascending by chapter number; the cache key derivation depends on
    /// this ordering being deterministic.
    pub weak_areas: Vec<WeakArea>,
    pub total_wrong_answers: u32,
    pub mentor_available: bool,
}

impl MentorAnalysis {
    /// True when any weak chapter carries at least one weak concept.
    #[must_use]
    pub fn has_weak_concepts(&self) -> bool {
        self.weak_areas.iter().any(|area| !area.weak_concepts.is_empty())
    }
}

/// Availability probe answered without building the full analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorStatus {
    pub mentor_available: bool,
    pub chapters_completed: u32,
    pub chapters_required: u32,
    pub average_score: f64,
    pub weak_areas_count: u32,
    pub total_wrong_answers: u32,
}
