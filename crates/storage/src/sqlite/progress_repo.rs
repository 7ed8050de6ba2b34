use chrono::Utc;

use mentor_core::model::ProgressRecord;

use super::SqliteRepository;
use super::mapping::{answers_to_json, map_progress_row};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn list_progress(
        &self,
        user_id: &str,
        course_slug: &str,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT chapter_number, chapter_title, score, answers
                FROM progress_records
                WHERE user_id = ?1 AND course_slug = ?2
                ORDER BY chapter_number ASC
            ",
        )
        .bind(user_id)
        .bind(course_slug)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(map_progress_row(&row)?);
        }
        Ok(records)
    }

    async fn upsert_progress(
        &self,
        user_id: &str,
        course_slug: &str,
        record: &ProgressRecord,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO progress_records (
                    user_id, course_slug, chapter_number, chapter_title,
                    score, answers, updated_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(user_id, course_slug, chapter_number) DO UPDATE SET
                    chapter_title = excluded.chapter_title,
                    score = excluded.score,
                    answers = excluded.answers,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(user_id)
        .bind(course_slug)
        .bind(i64::from(record.chapter_number))
        .bind(&record.chapter_title)
        .bind(record.score)
        .bind(answers_to_json(&record.answers)?)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
