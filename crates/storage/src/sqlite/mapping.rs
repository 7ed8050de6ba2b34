use sqlx::Row;
use uuid::Uuid;

use mentor_core::model::{
    ChapterAnswer, ChapterOutline, GapQuizId, GapQuizQuestion, ProgressRecord, QuestionKind,
    QuestionSource,
};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn quiz_id_from_text(v: &str) -> Result<GapQuizId, StorageError> {
    Ok(GapQuizId::from_uuid(Uuid::parse_str(v).map_err(ser)?))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

/// Optional string list stored as a JSON text column.
pub(crate) fn options_to_json(options: Option<&Vec<String>>) -> Result<Option<String>, StorageError> {
    options.map(|o| serde_json::to_string(o).map_err(ser)).transpose()
}

pub(crate) fn options_from_json(json: Option<String>) -> Result<Option<Vec<String>>, StorageError> {
    json.map(|j| serde_json::from_str(&j).map_err(ser)).transpose()
}

pub(crate) fn answers_to_json(answers: &[ChapterAnswer]) -> Result<String, StorageError> {
    serde_json::to_string(answers).map_err(ser)
}

pub(crate) fn answers_from_json(json: &str) -> Result<Vec<ChapterAnswer>, StorageError> {
    serde_json::from_str(json).map_err(ser)
}

pub(crate) fn chapters_to_json(chapters: &[ChapterOutline]) -> Result<String, StorageError> {
    serde_json::to_string(chapters).map_err(ser)
}

pub(crate) fn chapters_from_json(json: &str) -> Result<Vec<ChapterOutline>, StorageError> {
    serde_json::from_str(json).map_err(ser)
}

pub(crate) fn map_question_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<GapQuizQuestion, StorageError> {
    let kind_str: String = row.try_get("kind").map_err(ser)?;
    let source_str: String = row.try_get("source").map_err(ser)?;

    Ok(GapQuizQuestion {
        id: row.try_get("question_id").map_err(ser)?,
        kind: QuestionKind::parse(&kind_str).map_err(ser)?,
        question_text: row.try_get("question_text").map_err(ser)?,
        options: options_from_json(row.try_get("options").map_err(ser)?)?,
        correct_answer: row.try_get("correct_answer").map_err(ser)?,
        explanation: row.try_get("explanation").map_err(ser)?,
        hint: row.try_get("hint").map_err(ser)?,
        source: QuestionSource::parse(&source_str).map_err(ser)?,
        source_chapter: u32_from_i64(
            "source_chapter",
            row.try_get::<i64, _>("source_chapter").map_err(ser)?,
        )?,
        target_concept: row.try_get("target_concept").map_err(ser)?,
    })
}

pub(crate) fn map_progress_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<ProgressRecord, StorageError> {
    let answers_json: String = row.try_get("answers").map_err(ser)?;
    Ok(ProgressRecord {
        chapter_number: u32_from_i64(
            "chapter_number",
            row.try_get::<i64, _>("chapter_number").map_err(ser)?,
        )?,
        chapter_title: row.try_get("chapter_title").map_err(ser)?,
        score: row.try_get("score").map_err(ser)?,
        answers: answers_from_json(&answers_json)?,
    })
}
