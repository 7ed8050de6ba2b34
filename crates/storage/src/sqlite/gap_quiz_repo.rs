use sqlx::Row;

use mentor_core::model::{GapQuiz, GapQuizId};

use super::SqliteRepository;
use super::mapping::{map_question_row, options_to_json, quiz_id_from_text, ser};
use crate::repository::{GapQuizRepository, StorageError};

fn store_error(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
        _ => StorageError::Connection(e.to_string()),
    }
}

#[async_trait::async_trait]
impl GapQuizRepository for SqliteRepository {
    async fn lookup(
        &self,
        course_slug: &str,
        weak_areas_key: &str,
        include_hints: bool,
    ) -> Result<Option<GapQuiz>, StorageError> {
        let Some(quiz_row) = sqlx::query(
            r"
                SELECT id, course_slug, weak_areas_key, include_hints, created_at
                FROM gap_quizzes
                WHERE course_slug = ?1 AND weak_areas_key = ?2 AND include_hints = ?3
            ",
        )
        .bind(course_slug)
        .bind(weak_areas_key)
        .bind(include_hints)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        else {
            return Ok(None);
        };

        let id_text: String = quiz_row.try_get("id").map_err(ser)?;
        let id = quiz_id_from_text(&id_text)?;

        let question_rows = sqlx::query(
            r"
                SELECT
                    question_id, kind, question_text, options, correct_answer,
                    explanation, hint, source, source_chapter, target_concept
                FROM gap_quiz_questions
                WHERE quiz_id = ?1
                ORDER BY position ASC
            ",
        )
        .bind(&id_text)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut questions = Vec::with_capacity(question_rows.len());
        for row in question_rows {
            questions.push(map_question_row(&row)?);
        }

        Ok(Some(GapQuiz {
            id,
            course_slug: quiz_row.try_get("course_slug").map_err(ser)?,
            weak_areas_key: quiz_row.try_get("weak_areas_key").map_err(ser)?,
            include_hints: quiz_row.try_get("include_hints").map_err(ser)?,
            questions,
            created_at: quiz_row.try_get("created_at").map_err(ser)?,
        }))
    }

    async fn store(&self, quiz: &GapQuiz) -> Result<GapQuizId, StorageError> {
        let id_text = quiz.id.value().to_string();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query(
            r"
                INSERT INTO gap_quizzes (
                    id, course_slug, weak_areas_key, include_hints, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(&id_text)
        .bind(&quiz.course_slug)
        .bind(&quiz.weak_areas_key)
        .bind(quiz.include_hints)
        .bind(quiz.created_at)
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

        for (position, question) in quiz.questions.iter().enumerate() {
            let position = i64::try_from(position)
                .map_err(|_| StorageError::Serialization("position overflow".into()))?;
            sqlx::query(
                r"
                    INSERT INTO gap_quiz_questions (
                        quiz_id, position, question_id, kind, question_text,
                        options, correct_answer, explanation, hint, source,
                        source_chapter, target_concept
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                ",
            )
            .bind(&id_text)
            .bind(position)
            .bind(&question.id)
            .bind(question.kind.as_str())
            .bind(&question.question_text)
            .bind(options_to_json(question.options.as_ref())?)
            .bind(&question.correct_answer)
            .bind(&question.explanation)
            .bind(question.hint.as_deref())
            .bind(question.source.as_str())
            .bind(i64::from(question.source_chapter))
            .bind(question.target_concept.as_deref())
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(quiz.id)
    }
}
