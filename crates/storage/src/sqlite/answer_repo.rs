use async_trait::async_trait;
use evaluation_core::model::{ContributionId, QuestionId, Rating, TextAnswer, TextAnswerState};
use sqlx::{QueryBuilder, Sqlite};

use super::SqliteRepository;
use super::mapping::{
    contribution_id_to_i64, conn, map_rating_row, map_text_answer_row, question_id_to_i64,
};
use crate::repository::{AnswerRepository, StorageError};

impl SqliteRepository {
    /// Store a rating answer. Used for seeding; answer entry lives elsewhere.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the insert fails.
    pub async fn insert_rating_answer(
        &self,
        contribution: ContributionId,
        question: QuestionId,
        rating: Rating,
    ) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO rating_answers (contribution_id, question_id, answer)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(contribution_id_to_i64(contribution)?)
        .bind(question_id_to_i64(question)?)
        .bind(i64::from(rating))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    /// Store a text answer with its moderation state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the insert fails.
    pub async fn insert_text_answer(&self, answer: &TextAnswer) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO text_answers (contribution_id, question_id, answer, state)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(contribution_id_to_i64(answer.contribution_id)?)
        .bind(question_id_to_i64(answer.question_id)?)
        .bind(answer.text.as_str())
        .bind(answer.state.code())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }
}

#[async_trait]
impl AnswerRepository for SqliteRepository {
    async fn count_rating_answers(
        &self,
        contribution: ContributionId,
        question: QuestionId,
    ) -> Result<usize, StorageError> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM rating_answers
            WHERE contribution_id = ?1 AND question_id = ?2
            ",
        )
        .bind(contribution_id_to_i64(contribution)?)
        .bind(question_id_to_i64(question)?)
        .fetch_one(&self.pool)
        .await
        .map_err(conn)?;

        usize::try_from(count)
            .map_err(|_| StorageError::Serialization(format!("invalid answer count: {count}")))
    }

    async fn rating_answers(
        &self,
        contribution: ContributionId,
        question: QuestionId,
    ) -> Result<Vec<Rating>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT answer FROM rating_answers
            WHERE contribution_id = ?1 AND question_id = ?2
            ORDER BY id ASC
            ",
        )
        .bind(contribution_id_to_i64(contribution)?)
        .bind(question_id_to_i64(question)?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_rating_row).collect()
    }

    async fn text_answers(
        &self,
        contribution: ContributionId,
        question: QuestionId,
        states: Option<&[TextAnswerState]>,
    ) -> Result<Vec<TextAnswer>, StorageError> {
        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT contribution_id, question_id, answer, state FROM text_answers WHERE contribution_id = ",
        );
        query.push_bind(contribution_id_to_i64(contribution)?);
        query.push(" AND question_id = ");
        query.push_bind(question_id_to_i64(question)?);

        if let Some(states) = states {
            if states.is_empty() {
                return Ok(Vec::new());
            }
            query.push(" AND state IN (");
            let mut separated = query.separated(", ");
            for state in states {
                separated.push_bind(state.code());
            }
            separated.push_unseparated(")");
        }
        query.push(" ORDER BY id ASC");

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_text_answer_row).collect()
    }
}
