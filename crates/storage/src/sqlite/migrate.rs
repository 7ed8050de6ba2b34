use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the full schema: gap quizzes with their questions, progress
/// records, and course outlines. The UNIQUE constraint on
/// `(course_slug, weak_areas_key, include_hints)` is load-bearing: it is
/// how concurrent composers lose the store race instead of overwriting
/// each other.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS gap_quizzes (
                    id TEXT PRIMARY KEY,
                    course_slug TEXT NOT NULL,
                    weak_areas_key TEXT NOT NULL,
                    include_hints INTEGER NOT NULL CHECK (include_hints IN (0, 1)),
                    created_at TEXT NOT NULL,
                    UNIQUE (course_slug, weak_areas_key, include_hints)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS gap_quiz_questions (
                    quiz_id TEXT NOT NULL REFERENCES gap_quizzes(id) ON DELETE CASCADE,
                    position INTEGER NOT NULL CHECK (position >= 0),
                    question_id TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    question_text TEXT NOT NULL,
                    options TEXT,
                    correct_answer TEXT NOT NULL,
                    explanation TEXT NOT NULL,
                    hint TEXT,
                    source TEXT NOT NULL,
                    source_chapter INTEGER NOT NULL CHECK (source_chapter >= 0),
                    target_concept TEXT,
                    PRIMARY KEY (quiz_id, position)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS progress_records (
                    user_id TEXT NOT NULL,
                    course_slug TEXT NOT NULL,
                    chapter_number INTEGER NOT NULL CHECK (chapter_number >= 1),
                    chapter_title TEXT NOT NULL,
                    score REAL NOT NULL CHECK (score >= 0.0 AND score <= 1.0),
                    answers TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    PRIMARY KEY (user_id, course_slug, chapter_number)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS courses (
                    slug TEXT PRIMARY KEY,
                    topic TEXT NOT NULL,
                    difficulty TEXT NOT NULL,
                    chapters TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_gap_quizzes_course
                ON gap_quizzes (course_slug);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (1, ?1)")
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
    }

    Ok(())
}
