//! Database schema migrations (idempotent).

use anyhow::Result;
use sqlx::SqlitePool;

/// Create the `analysis_results` and `similar_files` tables if missing.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analysis_results (
            file_id TEXT PRIMARY KEY,
            paragraph_count INTEGER NOT NULL,
            word_count INTEGER NOT NULL,
            character_count INTEGER NOT NULL,
            is_plagiarism INTEGER NOT NULL,
            word_cloud_location TEXT,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS similar_files (
            file_id TEXT NOT NULL,
            similar_file_id TEXT NOT NULL,
            PRIMARY KEY (file_id, similar_file_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
