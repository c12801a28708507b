//! CLI entry points for `docsift analyze`, `docsift wordcloud` and
//! `docsift similar`.
//!
//! Each command opens the database, makes sure the schema exists, and
//! prints a human-readable summary (or JSON with `--json`).

use std::path::Path;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use docsift_core::models::AnalysisReport;
use docsift_core::store::ResultStore;

use crate::analyze::AnalysisEngine;
use crate::config::Config;
use crate::sqlite_store::SqliteResultStore;
use crate::{db, migrate};

async fn open_engine(config: &Config) -> Result<(AnalysisEngine, sqlx::SqlitePool)> {
    let pool = db::connect(config).await?;
    migrate::run_migrations(&pool).await?;
    let engine = AnalysisEngine::from_config(config, pool.clone())?;
    Ok((engine, pool))
}

/// `docsift analyze <id> [--wordcloud] [--json]`
pub async fn run_analyze(
    config: &Config,
    id: &str,
    wordcloud: bool,
    json: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let (engine, pool) = open_engine(config).await?;
    let report = engine.analyze_document(id, wordcloud, cancel).await;
    pool.close().await;
    let report = report?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &AnalysisReport) {
    println!("--- Analysis ---");
    println!("document:     {}", report.document_id);
    println!("paragraphs:   {}", report.stats.paragraph_count);
    println!("words:        {}", report.stats.word_count);
    println!("characters:   {}", report.stats.character_count);
    println!("plagiarism:   {}", if report.is_plagiarism { "yes" } else { "no" });
    if !report.similar_ids.is_empty() {
        println!("similar:      {}", report.similar_ids.join(", "));
    }
    if let Some(ref location) = report.word_cloud_location {
        println!("word cloud:   {}", location);
    }
    if report.cached {
        println!("(stored result)");
    }
}

/// `docsift wordcloud <location> --output <path>`
pub async fn run_wordcloud(
    config: &Config,
    location: &str,
    output: &Path,
    cancel: &CancellationToken,
) -> Result<()> {
    let (engine, pool) = open_engine(config).await?;
    let image = engine.get_word_cloud(location, cancel).await;
    pool.close().await;
    let image = image?;

    std::fs::write(output, &image)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {} bytes to {}", image.len(), output.display());
    Ok(())
}

/// `docsift similar <id>`
pub async fn run_similar(config: &Config, id: &str) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate::run_migrations(&pool).await?;
    let store = SqliteResultStore::new(pool.clone());

    let edges = store.get_similar_edges(id).await;
    pool.close().await;
    let edges = edges?;

    if edges.is_empty() {
        println!("No similar documents recorded for {}.", id);
    } else {
        println!("--- Similar to {} ({}) ---", id, edges.len());
        for similar in edges {
            println!("{}", similar);
        }
    }
    Ok(())
}
