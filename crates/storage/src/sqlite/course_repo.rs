use sqlx::Row;

use mentor_core::model::CourseOutline;

use super::SqliteRepository;
use super::mapping::{chapters_from_json, chapters_to_json, ser};
use crate::repository::{CourseRepository, StorageError};

#[async_trait::async_trait]
impl CourseRepository for SqliteRepository {
    async fn get_course(&self, slug: &str) -> Result<CourseOutline, StorageError> {
        let row = sqlx::query(
            r"
                SELECT slug, topic, difficulty, chapters
                FROM courses
                WHERE slug = ?1
            ",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        let chapters_json: String = row.try_get("chapters").map_err(ser)?;
        Ok(CourseOutline {
            slug: row.try_get("slug").map_err(ser)?,
            topic: row.try_get("topic").map_err(ser)?,
            difficulty: row.try_get("difficulty").map_err(ser)?,
            chapters: chapters_from_json(&chapters_json)?,
        })
    }

    async fn upsert_course(&self, course: &CourseOutline) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO courses (slug, topic, difficulty, chapters)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(slug) DO UPDATE SET
                    topic = excluded.topic,
                    difficulty = excluded.difficulty,
                    chapters = excluded.chapters
            ",
        )
        .bind(&course.slug)
        .bind(&course.topic)
        .bind(&course.difficulty)
        .bind(chapters_to_json(&course.chapters)?)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
