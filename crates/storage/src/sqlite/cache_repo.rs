use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use evaluation_core::model::ResultSection;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, decode_sections, encode_sections, ser};
use crate::repository::{ResultCache, StorageError};

#[async_trait]
impl ResultCache for SqliteRepository {
    async fn get(&self, key: &str) -> Result<Option<Vec<ResultSection>>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT payload, expires_at FROM result_cache WHERE cache_key = ?1
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let expires_at: DateTime<Utc> = row.try_get("expires_at").map_err(ser)?;
        if self.clock.has_passed(expires_at) {
            return Ok(None);
        }

        let payload: String = row.try_get("payload").map_err(ser)?;
        decode_sections(&payload).map(Some)
    }

    async fn set(
        &self,
        key: &str,
        sections: &[ResultSection],
        ttl: Duration,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO result_cache (cache_key, payload, expires_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(cache_key) DO UPDATE SET
                payload = excluded.payload,
                expires_at = excluded.expires_at
            ",
        )
        .bind(key)
        .bind(encode_sections(sections)?)
        .bind(self.clock.deadline(ttl))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
