use std::sync::Arc;

use mentor_core::analyzer::{AnalyzerConfig, WeakAreaAnalyzer};
use mentor_core::model::{MentorAnalysis, MentorStatus};
use storage::repository::{CourseRepository, ProgressRepository};

use crate::composer::{ComposedQuiz, GapQuizComposer};
use crate::error::MentorError;

/// Facade over weak-area analysis and gap-quiz composition.
///
/// All collaborators arrive through the constructor; nothing is resolved
/// from global state.
pub struct MentorService {
    progress: Arc<dyn ProgressRepository>,
    courses: Arc<dyn CourseRepository>,
    analyzer: WeakAreaAnalyzer,
    composer: GapQuizComposer,
}

impl MentorService {
    #[must_use]
    pub fn new(
        progress: Arc<dyn ProgressRepository>,
        courses: Arc<dyn CourseRepository>,
        config: AnalyzerConfig,
        composer: GapQuizComposer,
    ) -> Self {
        Self {
            progress,
            courses,
            analyzer: WeakAreaAnalyzer::new(config),
            composer,
        }
    }

    /// Cheap availability probe for a (user, course).
    ///
    /// A learner with no history gets a locked status, not an error.
    ///
    /// # Errors
    ///
    /// Returns `MentorError` for storage failures or malformed history.
    pub async fn status(
        &self,
        user_id: &str,
        course_slug: &str,
    ) -> Result<MentorStatus, MentorError> {
        let records = self.progress.list_progress(user_id, course_slug).await?;
        Ok(self.analyzer.status(&records)?)
    }

    /// Full weak-area analysis, recomputed on every call.
    ///
    /// # Errors
    ///
    /// Returns `MentorError::Storage(NotFound)` for an unknown course and
    /// `MentorError::Analyzer` for malformed history.
    pub async fn analyze(
        &self,
        user_id: &str,
        course_slug: &str,
    ) -> Result<MentorAnalysis, MentorError> {
        let course = self.courses.get_course(course_slug).await?;
        let records = self.progress.list_progress(user_id, course_slug).await?;
        Ok(self.analyzer.analyze(&course, &records)?)
    }

    /// Analyzes, then composes (cache-first) the learner's gap quiz.
    ///
    /// # Errors
    ///
    /// Returns `MentorError::MentorUnavailable` before the learner has
    /// completed enough chapters, plus everything `analyze` and the
    /// composer can fail with.
    pub async fn gap_quiz(
        &self,
        user_id: &str,
        course_slug: &str,
        include_hints: bool,
        max_extra_questions: u32,
    ) -> Result<ComposedQuiz, MentorError> {
        let course = self.courses.get_course(course_slug).await?;
        let records = self.progress.list_progress(user_id, course_slug).await?;
        let analysis = self.analyzer.analyze(&course, &records)?;

        if !analysis.mentor_available {
            tracing::warn!(
                "gap quiz requested before unlock for course {course_slug}: {} of {} chapters",
                analysis.total_chapters_completed,
                self.analyzer.config().chapters_threshold(),
            );
            return Err(MentorError::MentorUnavailable {
                completed: analysis.total_chapters_completed,
                required: self.analyzer.config().chapters_threshold(),
            });
        }

        let composed = self
            .composer
            .compose(&analysis, &records, include_hints, max_extra_questions)
            .await?;

        if composed.cache_hit {
            tracing::info!(
                "gap quiz served from cache for course {course_slug} (key '{}')",
                composed.quiz.weak_areas_key,
            );
        } else {
            tracing::info!(
                "composed gap quiz for course {course_slug} (key '{}'): {} review + {} extra",
                composed.quiz.weak_areas_key,
                composed.quiz.review_count(),
                composed.quiz.extra_count(),
            );
        }

        Ok(composed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentor_core::model::{
        ChapterAnswer, ChapterOutline, CourseOutline, ProgressRecord, QuestionKind,
    };
    use mentor_core::time::fixed_clock;
    use storage::repository::{InMemoryRepository, StorageError};

    use crate::ai::MockGenerator;
    use crate::error::ComposeError;

    fn service(repo: &InMemoryRepository) -> MentorService {
        let composer = GapQuizComposer::new(
            Arc::new(repo.clone()),
            Arc::new(MockGenerator::new()),
        )
        .with_clock(fixed_clock());
        MentorService::new(
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            AnalyzerConfig::new(2, 0.7).unwrap(),
            composer,
        )
    }

    fn answer(text: &str, is_correct: bool) -> ChapterAnswer {
        ChapterAnswer {
            question_id: "mcq_1".into(),
            kind: QuestionKind::Mcq,
            question_text: text.into(),
            options: Some(vec!["A) right".into(), "B) wrong".into()]),
            user_answer: if is_correct { "A".into() } else { "B".into() },
            correct_answer: "A".into(),
            explanation: "A is right.".into(),
            is_correct,
        }
    }

    async fn seed(repo: &InMemoryRepository) {
        use storage::repository::{CourseRepository as _, ProgressRepository as _};

        repo.upsert_course(&CourseOutline {
            slug: "pm-beginner".into(),
            topic: "project management".into(),
            difficulty: "beginner".into(),
            chapters: vec![
                ChapterOutline {
                    number: 1,
                    title: "Planning".into(),
                    key_concepts: vec!["planning".into()],
                },
                ChapterOutline {
                    number: 2,
                    title: "Execution".into(),
                    key_concepts: vec!["execution".into()],
                },
            ],
        })
        .await
        .unwrap();

        repo.upsert_progress(
            "u1",
            "pm-beginner",
            &ProgressRecord {
                chapter_number: 1,
                chapter_title: "Planning".into(),
                score: 0.5,
                answers: vec![answer("What is planning?", false), answer("ok", true)],
            },
        )
        .await
        .unwrap();
        repo.upsert_progress(
            "u1",
            "pm-beginner",
            &ProgressRecord {
                chapter_number: 2,
                chapter_title: "Execution".into(),
                score: 0.9,
                answers: vec![answer("Execution basics", true)],
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn unknown_course_surfaces_not_found() {
        let repo = InMemoryRepository::new();
        let err = service(&repo).analyze("u1", "missing").await.unwrap_err();
        assert!(matches!(err, MentorError::Storage(StorageError::NotFound)));
    }

    #[tokio::test]
    async fn status_does_not_require_history() {
        let repo = InMemoryRepository::new();
        let status = service(&repo).status("u1", "pm-beginner").await.unwrap();
        assert!(!status.mentor_available);
        assert_eq!(status.chapters_completed, 0);
        assert_eq!(status.chapters_required, 2);
    }

    #[tokio::test]
    async fn locked_mentor_rejects_gap_quiz() {
        let repo = InMemoryRepository::new();
        seed(&repo).await;

        // bump the unlock bar so two completed chapters are not enough
        let composer = GapQuizComposer::new(
            Arc::new(repo.clone()),
            Arc::new(MockGenerator::new()),
        );
        let strict = MentorService::new(
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            AnalyzerConfig::new(5, 0.7).unwrap(),
            composer,
        );

        let err = strict
            .gap_quiz("u1", "pm-beginner", false, 0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MentorError::MentorUnavailable {
                completed: 2,
                required: 5
            }
        ));
    }

    #[tokio::test]
    async fn gap_quiz_composes_then_hits_cache() {
        let repo = InMemoryRepository::new();
        seed(&repo).await;
        let service = service(&repo);

        let analysis = service.analyze("u1", "pm-beginner").await.unwrap();
        assert!(analysis.mentor_available);
        assert_eq!(analysis.weak_areas.len(), 1);

        let first = service
            .gap_quiz("u1", "pm-beginner", false, 2)
            .await
            .unwrap();
        assert!(!first.cache_hit);
        assert_eq!(first.quiz.weak_areas_key, "1");
        assert_eq!(first.quiz.review_count(), 1);

        let second = service
            .gap_quiz("u1", "pm-beginner", false, 2)
            .await
            .unwrap();
        assert!(second.cache_hit);
        assert_eq!(second.quiz.questions, first.quiz.questions);
    }

    #[tokio::test]
    async fn generation_failure_propagates_distinctly() {
        struct FailingGenerator;

        #[async_trait::async_trait]
        impl crate::ai::QuestionGenerator for FailingGenerator {
            fn name(&self) -> &'static str {
                "failing"
            }

            async fn generate(
                &self,
                _request: &crate::ai::GenerationRequest,
            ) -> Result<Vec<crate::ai::GeneratedQuestion>, crate::error::GenerationError>
            {
                Err(crate::error::GenerationError::Disabled)
            }
        }

        let repo = InMemoryRepository::new();
        seed(&repo).await;
        let composer = GapQuizComposer::new(Arc::new(repo.clone()), Arc::new(FailingGenerator));
        let service = MentorService::new(
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            AnalyzerConfig::new(2, 0.7).unwrap(),
            composer,
        );

        let err = service
            .gap_quiz("u1", "pm-beginner", false, 3)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MentorError::Compose(ComposeError::Generation(_))
        ));
    }
}
