use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use mentor_core::model::{CourseOutline, GapQuiz, GapQuizId, ProgressRecord};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Cache contract for stored gap quizzes.
///
/// A quiz is keyed by `(course_slug, weak_areas_key, include_hints)`; the
/// backing store enforces uniqueness on that triple. That constraint is
/// the engine's only coordination primitive: concurrent composers race on
/// `store`, the loser gets `Conflict` and re-reads.
#[async_trait]
pub trait GapQuizRepository: Send + Sync {
    /// Fetch the quiz stored under the triple, if any. No side effects.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures; a miss is `Ok(None)`.
    async fn lookup(
        &self,
        course_slug: &str,
        weak_areas_key: &str,
        include_hints: bool,
    ) -> Result<Option<GapQuiz>, StorageError>;

    /// Persist a freshly composed quiz.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a quiz already exists for the
    /// quiz's `(course_slug, weak_areas_key, include_hints)` triple.
    async fn store(&self, quiz: &GapQuiz) -> Result<GapQuizId, StorageError>;
}

/// Read side of the progress-tracking collaborator.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// All progress records for a (user, course), unordered.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures. An unknown pair yields
    /// an empty list, not `NotFound`.
    async fn list_progress(
        &self,
        user_id: &str,
        course_slug: &str,
    ) -> Result<Vec<ProgressRecord>, StorageError>;

    /// Insert or replace one chapter's record for a (user, course).
    ///
    /// Owned by the progress-tracking collaborator; exposed here so tests
    /// and seeds can populate histories.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn upsert_progress(
        &self,
        user_id: &str,
        course_slug: &str,
        record: &ProgressRecord,
    ) -> Result<(), StorageError>;
}

/// Course-outline lookups from the course collaborator.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Fetch a course outline by slug.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the slug is unknown.
    async fn get_course(&self, slug: &str) -> Result<CourseOutline, StorageError>;

    /// Persist or update a course outline.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the outline cannot be stored.
    async fn upsert_course(&self, course: &CourseOutline) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    quizzes: Arc<Mutex<HashMap<(String, String, bool), GapQuiz>>>,
    progress: Arc<Mutex<HashMap<(String, String), HashMap<u32, ProgressRecord>>>>,
    courses: Arc<Mutex<HashMap<String, CourseOutline>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GapQuizRepository for InMemoryRepository {
    async fn lookup(
        &self,
        course_slug: &str,
        weak_areas_key: &str,
        include_hints: bool,
    ) -> Result<Option<GapQuiz>, StorageError> {
        let guard = self
            .quizzes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .get(&(
                course_slug.to_owned(),
                weak_areas_key.to_owned(),
                include_hints,
            ))
            .cloned())
    }

    async fn store(&self, quiz: &GapQuiz) -> Result<GapQuizId, StorageError> {
        let mut guard = self
            .quizzes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let key = (
            quiz.course_slug.clone(),
            quiz.weak_areas_key.clone(),
            quiz.include_hints,
        );
        if guard.contains_key(&key) {
            return Err(StorageError::Conflict);
        }
        guard.insert(key, quiz.clone());
        Ok(quiz.id)
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn list_progress(
        &self,
        user_id: &str,
        course_slug: &str,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut records: Vec<ProgressRecord> = guard
            .get(&(user_id.to_owned(), course_slug.to_owned()))
            .map(|by_chapter| by_chapter.values().cloned().collect())
            .unwrap_or_default();
        records.sort_by_key(|record| record.chapter_number);
        Ok(records)
    }

    async fn upsert_progress(
        &self,
        user_id: &str,
        course_slug: &str,
        record: &ProgressRecord,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .entry((user_id.to_owned(), course_slug.to_owned()))
            .or_default()
            .insert(record.chapter_number, record.clone());
        Ok(())
    }
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn get_course(&self, slug: &str) -> Result<CourseOutline, StorageError> {
        let guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(slug).cloned().ok_or(StorageError::NotFound)
    }

    async fn upsert_course(&self, course: &CourseOutline) -> Result<(), StorageError> {
        let mut guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(course.slug.clone(), course.clone());
        Ok(())
    }
}

/// Aggregates the repositories behind trait objects for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub quizzes: Arc<dyn GapQuizRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub courses: Arc<dyn CourseRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let quizzes: Arc<dyn GapQuizRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let courses: Arc<dyn CourseRepository> = Arc::new(repo);
        Self {
            quizzes,
            progress,
            courses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentor_core::model::{ChapterOutline, GapQuizQuestion, QuestionKind, QuestionSource};
    use mentor_core::time::fixed_now;

    fn build_quiz(course_slug: &str, key: &str, include_hints: bool) -> GapQuiz {
        GapQuiz {
            id: GapQuizId::new(),
            course_slug: course_slug.into(),
            weak_areas_key: key.into(),
            include_hints,
            questions: vec![GapQuizQuestion {
                id: "mcq_1".into(),
                kind: QuestionKind::Mcq,
                question_text: "What is planning?".into(),
                options: Some(vec!["A) A process".into(), "B) A document".into()]),
                correct_answer: "A".into(),
                explanation: "Planning is a process.".into(),
                hint: None,
                source: QuestionSource::WrongAnswer,
                source_chapter: 1,
                target_concept: Some("planning".into()),
            }],
            created_at: fixed_now(),
        }
    }

    fn build_record(chapter_number: u32, score: f64) -> ProgressRecord {
        ProgressRecord {
            chapter_number,
            chapter_title: format!("Chapter {chapter_number}"),
            score,
            answers: Vec::new(),
        }
    }

    #[tokio::test]
    async fn quiz_lookup_misses_then_hits() {
        let repo = InMemoryRepository::new();
        assert!(repo.lookup("pm", "1", false).await.unwrap().is_none());

        let quiz = build_quiz("pm", "1", false);
        repo.store(&quiz).await.unwrap();

        let found = repo.lookup("pm", "1", false).await.unwrap().unwrap();
        assert_eq!(found, quiz);
        // hints flag is part of the identity
        assert!(repo.lookup("pm", "1", true).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_store_conflicts() {
        let repo = InMemoryRepository::new();
        repo.store(&build_quiz("pm", "1-3", true)).await.unwrap();

        let err = repo.store(&build_quiz("pm", "1-3", true)).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
    }

    #[tokio::test]
    async fn progress_upsert_replaces_per_chapter() {
        let repo = InMemoryRepository::new();
        repo.upsert_progress("u1", "pm", &build_record(1, 0.4))
            .await
            .unwrap();
        repo.upsert_progress("u1", "pm", &build_record(2, 0.9))
            .await
            .unwrap();
        repo.upsert_progress("u1", "pm", &build_record(1, 0.8))
            .await
            .unwrap();

        let records = repo.list_progress("u1", "pm").await.unwrap();
        assert_eq!(records.len(), 2);
        assert!((records[0].score - 0.8).abs() < f64::EPSILON);

        assert!(repo.list_progress("u2", "pm").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let repo = InMemoryRepository::new();
        assert!(matches!(
            repo.get_course("missing").await.unwrap_err(),
            StorageError::NotFound
        ));

        let course = CourseOutline {
            slug: "pm".into(),
            topic: "project management".into(),
            difficulty: "beginner".into(),
            chapters: vec![ChapterOutline {
                number: 1,
                title: "Planning".into(),
                key_concepts: vec!["planning".into()],
            }],
        };
        repo.upsert_course(&course).await.unwrap();
        assert_eq!(repo.get_course("pm").await.unwrap(), course);
    }
}
