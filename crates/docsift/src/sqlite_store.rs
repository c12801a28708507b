//! SQLite-backed [`ResultStore`] implementation.
//!
//! Results live in `analysis_results` (one row per document, upserted) and
//! similarity edges in `similar_files` (composite primary key, so duplicate
//! inserts are ignored). See [`crate::migrate`] for the schema.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use docsift_core::models::{AnalysisResult, DocumentStats};
use docsift_core::store::ResultStore;

/// SQLite implementation of the [`ResultStore`] trait.
pub struct SqliteResultStore {
    pool: SqlitePool,
}

impl SqliteResultStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ResultStore for SqliteResultStore {
    async fn save_result(&self, document_id: &str, result: &AnalysisResult) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO analysis_results (file_id, paragraph_count, word_count, character_count,
                                          is_plagiarism, word_cloud_location, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(file_id) DO UPDATE SET
                paragraph_count = excluded.paragraph_count,
                word_count = excluded.word_count,
                character_count = excluded.character_count,
                is_plagiarism = excluded.is_plagiarism,
                word_cloud_location = excluded.word_cloud_location,
                created_at = excluded.created_at
            "#,
        )
        .bind(document_id)
        .bind(i64::from(result.stats.paragraph_count))
        .bind(i64::from(result.stats.word_count))
        .bind(i64::from(result.stats.character_count))
        .bind(result.is_plagiarism)
        .bind(&result.word_cloud_location)
        .bind(now)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to save analysis result for {}", document_id))?;

        Ok(())
    }

    async fn get_result(&self, document_id: &str) -> Result<Option<AnalysisResult>> {
        let row = sqlx::query(
            r#"
            SELECT paragraph_count, word_count, character_count, is_plagiarism, word_cloud_location
            FROM analysis_results
            WHERE file_id = ?
            "#,
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to get analysis result for {}", document_id))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let count = |column: &str| -> Result<u32> {
            let value: i64 = row.try_get(column)?;
            u32::try_from(value).with_context(|| format!("{} out of range: {}", column, value))
        };

        let location: Option<String> = row.try_get("word_cloud_location")?;
        Ok(Some(AnalysisResult {
            stats: DocumentStats {
                paragraph_count: count("paragraph_count")?,
                word_count: count("word_count")?,
                character_count: count("character_count")?,
            },
            is_plagiarism: row.try_get("is_plagiarism")?,
            word_cloud_location: location.filter(|l| !l.is_empty()),
        }))
    }

    async fn save_similar_edge(&self, document_id: &str, similar_id: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO similar_files (file_id, similar_file_id)
            VALUES (?, ?)
            ON CONFLICT(file_id, similar_file_id) DO NOTHING
            "#,
        )
        .bind(document_id)
        .bind(similar_id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to save similar file {} -> {}", document_id, similar_id))?;

        Ok(())
    }

    async fn get_similar_edges(&self, document_id: &str) -> Result<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT similar_file_id FROM similar_files WHERE file_id = ? ORDER BY similar_file_id",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("failed to query similar files for {}", document_id))?;

        Ok(ids)
    }

    async fn list_document_ids(&self) -> Result<Vec<String>> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT file_id FROM analysis_results ORDER BY file_id")
                .fetch_all(&self.pool)
                .await
                .context("failed to list analyzed documents")?;

        Ok(ids)
    }
}
