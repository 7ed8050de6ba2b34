use std::collections::HashMap;
use std::sync::Arc;

use mentor_core::Clock;
use mentor_core::analyzer::match_concept;
use mentor_core::cache_key::weak_areas_key;
use mentor_core::model::{
    GapQuiz, GapQuizId, GapQuizQuestion, MentorAnalysis, ProgressRecord, QuestionSource,
};
use storage::repository::{GapQuizRepository, StorageError};

use crate::ai::{GeneratedQuestion, GenerationRequest, QuestionGenerator};
use crate::error::{ComposeError, GenerationError};

//
// ─── COMPOSED QUIZ ────────────────────────────────────────────────────────────
//

/// A gap quiz plus whether it was served from the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedQuiz {
    pub quiz: GapQuiz,
    pub cache_hit: bool,
}

//
// ─── COMPOSER ─────────────────────────────────────────────────────────────────
//

/// Builds gap quizzes cache-first.
///
/// The flow is always lookup, then (on miss) generate, then store. A
/// store conflict means a concurrent composer won the race for the same
/// key; the loser re-reads and discards its own result, so at most one
/// quiz is ever stored per `(course_slug, weak_areas_key, include_hints)`.
pub struct GapQuizComposer {
    quizzes: Arc<dyn GapQuizRepository>,
    generator: Arc<dyn QuestionGenerator>,
    clock: Clock,
}

impl GapQuizComposer {
    #[must_use]
    pub fn new(quizzes: Arc<dyn GapQuizRepository>, generator: Arc<dyn QuestionGenerator>) -> Self {
        Self {
            quizzes,
            generator,
            clock: Clock::default(),
        }
    }

    /// `clock` stamps `created_at`; fix it in tests for determinism.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Composes (or fetches) the gap quiz for an analysis.
    ///
    /// A cache hit returns the stored quiz untouched, whatever
    /// `max_extra_questions` says: stored quizzes are immutable, and a
    /// hit must not trigger a generation call.
    ///
    /// # Errors
    ///
    /// Returns `ComposeError::Generation` when the generator fails or
    /// returns zero items even though extras were requested against a
    /// non-empty weak-concept set; `ComposeError::Storage` for backend
    /// failures. Nothing is stored on either path.
    pub async fn compose(
        &self,
        analysis: &MentorAnalysis,
        records: &[ProgressRecord],
        include_hints: bool,
        max_extra_questions: u32,
    ) -> Result<ComposedQuiz, ComposeError> {
        let key = weak_areas_key(&analysis.weak_areas);

        if let Some(quiz) = self
            .quizzes
            .lookup(&analysis.course_slug, &key, include_hints)
            .await?
        {
            return Ok(ComposedQuiz {
                quiz,
                cache_hit: true,
            });
        }

        // Review set: every wrong answer, in full, never truncated.
        let mut questions = review_questions(analysis, records, include_hints);

        if max_extra_questions > 0 {
            let request =
                GenerationRequest::from_analysis(analysis, include_hints, max_extra_questions);
            let generated = self.generator.generate(&request).await?;
            if generated.is_empty() && analysis.has_weak_concepts() {
                return Err(ComposeError::Generation(GenerationError::Empty));
            }
            let cap = usize::try_from(max_extra_questions).unwrap_or(usize::MAX);
            questions.extend(
                generated
                    .into_iter()
                    .take(cap)
                    .map(GeneratedQuestion::into_question),
            );
        }

        let quiz = GapQuiz {
            id: GapQuizId::new(),
            course_slug: analysis.course_slug.clone(),
            weak_areas_key: key.clone(),
            include_hints,
            questions,
            created_at: self.clock.now(),
        };

        match self.quizzes.store(&quiz).await {
            Ok(_) => Ok(ComposedQuiz {
                quiz,
                cache_hit: false,
            }),
            Err(StorageError::Conflict) => {
                // Lost the store race; the winner's quiz is canonical.
                let stored = self
                    .quizzes
                    .lookup(&analysis.course_slug, &key, include_hints)
                    .await?
                    .ok_or(StorageError::Conflict)?;
                Ok(ComposedQuiz {
                    quiz: stored,
                    cache_hit: true,
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

//
// ─── REVIEW QUESTIONS ─────────────────────────────────────────────────────────
//

/// One review question per wrong answer across all weak areas.
///
/// Chapters ascend (the analysis already orders them); within a chapter
/// the original answer order is preserved. Question text, correct answer
/// and explanation are reused verbatim; the learner retries the exact
/// question they missed.
fn review_questions(
    analysis: &MentorAnalysis,
    records: &[ProgressRecord],
    include_hints: bool,
) -> Vec<GapQuizQuestion> {
    // Last record per chapter wins, matching the analyzer.
    let by_chapter: HashMap<u32, &ProgressRecord> = records
        .iter()
        .map(|record| (record.chapter_number, record))
        .collect();

    let mut questions = Vec::new();
    for area in &analysis.weak_areas {
        let Some(record) = by_chapter.get(&area.chapter_number) else {
            continue;
        };
        let concept_names: Vec<String> = area
            .weak_concepts
            .iter()
            .map(|concept| concept.concept.clone())
            .collect();

        for answer in &record.answers {
            if answer.is_correct {
                continue;
            }
            questions.push(GapQuizQuestion {
                id: answer.question_id.clone(),
                kind: answer.kind,
                question_text: answer.question_text.clone(),
                options: answer.options.clone(),
                correct_answer: answer.correct_answer.clone(),
                explanation: answer.explanation.clone(),
                hint: include_hints.then(|| derive_hint(&answer.explanation)),
                source: QuestionSource::WrongAnswer,
                source_chapter: area.chapter_number,
                target_concept: match_concept(&answer.question_text, &concept_names)
                    .map(ToOwned::to_owned),
            });
        }
    }
    questions
}

const MAX_HINT_LEN: usize = 100;

/// Builds a nudge from the first sentence of an explanation without
/// giving the answer away.
fn derive_hint(explanation: &str) -> String {
    let first = explanation.split('.').next().unwrap_or("").trim();
    if first.is_empty() {
        return "Review the related concept carefully.".to_owned();
    }
    let mut lead: String = first.chars().take(MAX_HINT_LEN).collect();
    if first.chars().count() > MAX_HINT_LEN {
        lead.push_str("...");
    }
    format!("Think about: {lead}")
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//
