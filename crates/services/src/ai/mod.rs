//! Question-generation capability: one trait, provider implementations
//! selected by name through a registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use mentor_core::model::{GapQuizQuestion, MentorAnalysis, QuestionKind, QuestionSource};

use crate::error::GenerationError;

mod mock;
mod openai;

pub use mock::MockGenerator;
pub use openai::{OpenAiConfig, OpenAiGenerator};

//
// ─── REQUEST ──────────────────────────────────────────────────────────────────
//

/// One weak concept a generator should target.
#[derive(Debug, Clone, PartialEq)]
pub struct ConceptTarget {
    pub chapter_number: u32,
    pub concept: String,
    /// Up to three question texts the learner got wrong on this concept.
    pub sample_wrong_questions: Vec<String>,
}

/// Inputs for a single generation call.
///
/// Generators may return anywhere between zero and `max_questions` items;
/// the composer decides whether a short response is acceptable. Calls are
/// not assumed idempotent and are never retried by this engine.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub course_topic: String,
    pub difficulty: String,
    pub concepts: Vec<ConceptTarget>,
    pub include_hints: bool,
    pub max_questions: u32,
}

impl GenerationRequest {
    /// Builds a request from a weak-area analysis.
    #[must_use]
    pub fn from_analysis(
        analysis: &MentorAnalysis,
        include_hints: bool,
        max_questions: u32,
    ) -> Self {
        let concepts = analysis
            .weak_areas
            .iter()
            .flat_map(|area| {
                area.weak_concepts.iter().map(|concept| ConceptTarget {
                    chapter_number: area.chapter_number,
                    concept: concept.concept.clone(),
                    sample_wrong_questions: concept.sample_wrong_questions.clone(),
                })
            })
            .collect();
        Self {
            course_topic: analysis.course_topic.clone(),
            difficulty: analysis.difficulty.clone(),
            concepts,
            include_hints,
            max_questions,
        }
    }
}

//
// ─── GENERATED QUESTION ───────────────────────────────────────────────────────
//

/// A question as returned by a generation provider.
///
/// `difficulty` is generator context only; it does not survive into the
/// stored quiz question.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratedQuestion {
    pub id: String,
    pub kind: QuestionKind,
    pub question_text: String,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
    pub explanation: String,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Chapter this question targets; 0 means course-wide.
    pub source_chapter: u32,
    #[serde(default)]
    pub target_concept: Option<String>,
}

impl GeneratedQuestion {
    /// Converts into a storable quiz question tagged `source = extra`.
    #[must_use]
    pub fn into_question(self) -> GapQuizQuestion {
        GapQuizQuestion {
            id: self.id,
            kind: self.kind,
            question_text: self.question_text,
            options: self.options,
            correct_answer: self.correct_answer,
            explanation: self.explanation,
            hint: self.hint,
            source: QuestionSource::Extra,
            source_chapter: self.source_chapter,
            target_concept: self.target_concept,
        }
    }
}

//
// ─── CAPABILITY TRAIT ─────────────────────────────────────────────────────────
//

/// The text-generation capability, narrowed to gap-quiz questions.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Provider name used for registry lookup and logging.
    fn name(&self) -> &'static str;

    /// Generate up to `request.max_questions` questions.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` when the provider is unconfigured, the
    /// request fails, or the response cannot be interpreted. Returning an
    /// empty list is not an error at this layer.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GeneratedQuestion>, GenerationError>;
}

//
// ─── REGISTRY ─────────────────────────────────────────────────────────────────
//

/// Name-keyed provider selection.
///
/// Configuration picks the provider; callers never branch on concrete
/// generator types, and the mock is just another entry.
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    providers: HashMap<&'static str, Arc<dyn QuestionGenerator>>,
}

impl GeneratorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider under its own name; the last registration
    /// for a name wins.
    #[must_use]
    pub fn with(mut self, generator: Arc<dyn QuestionGenerator>) -> Self {
        self.providers.insert(generator.name(), generator);
        self
    }

    /// Looks a provider up by name.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::UnknownProvider` for unregistered names.
    pub fn get(&self, name: &str) -> Result<Arc<dyn QuestionGenerator>, GenerationError> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| GenerationError::UnknownProvider(name.to_owned()))
    }

    /// Standard registry: the OpenAI-compatible provider plus the mock.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new()
            .with(Arc::new(OpenAiGenerator::from_env()))
            .with(Arc::new(MockGenerator::new()))
    }

    /// Provider chosen by `MENTOR_AI_PROVIDER` (default `openai`).
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::UnknownProvider` if the configured name
    /// is not registered.
    pub fn select_from_env(&self) -> Result<Arc<dyn QuestionGenerator>, GenerationError> {
        let name =
            std::env::var("MENTOR_AI_PROVIDER").unwrap_or_else(|_| "openai".to_owned());
        self.get(&name)
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use mentor_core::model::{WeakArea, WeakConcept};

    fn analysis() -> MentorAnalysis {
        MentorAnalysis {
            course_slug: "pm-beginner".into(),
            course_topic: "project management".into(),
            difficulty: "beginner".into(),
            total_chapters_completed: 2,
            average_score: 0.6,
            weak_areas: vec![WeakArea {
                chapter_number: 1,
                chapter_title: "Planning".into(),
                score: 0.4,
                weak_concepts: vec![WeakConcept {
                    concept: "planning".into(),
                    wrong_count: 2,
                    total_questions: 4,
                    sample_wrong_questions: vec!["What is planning?".into()],
                }],
            }],
            total_wrong_answers: 2,
            mentor_available: true,
        }
    }

    #[test]
    fn request_flattens_weak_concepts() {
        let request = GenerationRequest::from_analysis(&analysis(), true, 5);
        assert_eq!(request.max_questions, 5);
        assert!(request.include_hints);
        assert_eq!(request.concepts.len(), 1);
        assert_eq!(request.concepts[0].chapter_number, 1);
        assert_eq!(request.concepts[0].concept, "planning");
    }

    #[test]
    fn registry_resolves_by_name() {
        let registry = GeneratorRegistry::new().with(Arc::new(MockGenerator::new()));
        assert_eq!(registry.get("mock").unwrap().name(), "mock");
        assert!(matches!(
            registry.get("openai").err().unwrap(),
            GenerationError::UnknownProvider(_)
        ));
    }

    #[test]
    fn generated_question_converts_to_extra() {
        let generated = GeneratedQuestion {
            id: "extra_1".into(),
            kind: QuestionKind::TrueFalse,
            question_text: "Planning matters.".into(),
            options: None,
            correct_answer: "true".into(),
            explanation: "It does.".into(),
            hint: None,
            difficulty: Some("easy".into()),
            source_chapter: 1,
            target_concept: Some("planning".into()),
        };

        let question = generated.into_question();
        assert_eq!(question.source, QuestionSource::Extra);
        assert_eq!(question.source_chapter, 1);
        assert!(question.is_correct("True"));
    }
}
