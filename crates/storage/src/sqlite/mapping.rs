use evaluation_core::model::{
    ContributionId, QuestionId, Rating, ResultSection, TextAnswer, TextAnswerState,
};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn contribution_id_to_i64(id: ContributionId) -> Result<i64, StorageError> {
    u64_to_i64("contribution_id", id.value())
}

pub(crate) fn question_id_to_i64(id: QuestionId) -> Result<i64, StorageError> {
    u64_to_i64("question_id", id.value())
}

pub(crate) fn map_rating_row(row: &sqlx::sqlite::SqliteRow) -> Result<Rating, StorageError> {
    let answer: i64 = row.try_get("answer").map_err(ser)?;
    Rating::new(answer).map_err(ser)
}

pub(crate) fn map_text_answer_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<TextAnswer, StorageError> {
    let state: String = row.try_get("state").map_err(ser)?;
    Ok(TextAnswer {
        contribution_id: ContributionId::new(i64_to_u64(
            "contribution_id",
            row.try_get("contribution_id").map_err(ser)?,
        )?),
        question_id: QuestionId::new(i64_to_u64(
            "question_id",
            row.try_get("question_id").map_err(ser)?,
        )?),
        text: row.try_get("answer").map_err(ser)?,
        state: TextAnswerState::from_code(&state).map_err(ser)?,
    })
}

pub(crate) fn encode_sections(sections: &[ResultSection]) -> Result<String, StorageError> {
    serde_json::to_string(sections).map_err(ser)
}

pub(crate) fn decode_sections(payload: &str) -> Result<Vec<ResultSection>, StorageError> {
    serde_json::from_str(payload).map_err(ser)
}
