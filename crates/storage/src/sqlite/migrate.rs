use evaluation_core::Clock;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs the versioned migrations for answers and the result cache.
pub async fn run_migrations(pool: &SqlitePool, clock: Clock) -> Result<(), SqliteInitError> {
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

    // Version 1: answers.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS rating_answers (
                    id INTEGER PRIMARY KEY,
                    contribution_id INTEGER NOT NULL,
                    question_id INTEGER NOT NULL,
                    answer INTEGER NOT NULL CHECK (answer BETWEEN 1 AND 5)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS text_answers (
                    id INTEGER PRIMARY KEY,
                    contribution_id INTEGER NOT NULL,
                    question_id INTEGER NOT NULL,
                    answer TEXT NOT NULL,
                    state TEXT NOT NULL CHECK (state IN ('HI', 'PU', 'PR', 'NR'))
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_rating_answers_contribution_question
                    ON rating_answers (contribution_id, question_id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_text_answers_contribution_question_state
                    ON text_answers (contribution_id, question_id, state);
            ",
        )
        .execute(&mut *tx)
        .await?;

        mark_applied(&mut tx, 1, clock).await?;
        tx.commit().await?;
        tracing::info!(version = 1, "applied answer schema migration");
    }

    // Version 2: result cache.
    if !is_applied(pool, 2).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS result_cache (
                    cache_key TEXT PRIMARY KEY,
                    payload TEXT NOT NULL,
                    expires_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        mark_applied(&mut tx, 2, clock).await?;
        tx.commit().await?;
        tracing::info!(version = 2, "applied result cache migration");
    }

    Ok(())
}

async fn mark_applied(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    version: i64,
    clock: Clock,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)")
        .bind(version)
        .bind(clock.now())
        .execute(&mut **tx)
        .await?;
    Ok(())
}
