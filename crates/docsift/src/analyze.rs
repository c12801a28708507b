//! The analysis engine: statistics, plagiarism detection, and word clouds
//! for one document at a time.
//!
//! # Request Flow
//!
//! ```text
//! analyze_document(id)
//!   ├── stored result?  ──yes──▶ return it (+ stored similar ids)
//!   ├── fetch target content        (missing ⇒ NotFound, bad id ⇒ Invalid,
//!   │                                error ⇒ UpstreamUnavailable)
//!   ├── compute stats
//!   ├── list corpus ids             (error ⇒ UpstreamUnavailable, nothing persisted)
//!   ├── fetch corpus content        (bounded parallelism, per-fetch timeout, best-effort)
//!   ├── compare against corpus
//!   ├── word cloud, if requested    (best-effort)
//!   ├── persist result              (error ⇒ Internal)
//!   └── persist similar edges       (best-effort)
//! ```
//!
//! Every collaborator call races the request's [`CancellationToken`]; a
//! cancelled request returns [`AnalysisError::Cancelled`] and, if the
//! result was not yet written, leaves no trace in the result store.
//!
//! Concurrent requests for the same id are not serialized. Both compute
//! the same answer and the store upserts, so the last write wins.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use futures_util::stream::{self, StreamExt};
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use docsift_core::error::AnalysisError;
use docsift_core::models::{AnalysisReport, AnalysisResult, DocumentContent};
use docsift_core::normalize::{decode, LexicalNormalizer};
use docsift_core::similarity::SimilarityDetector;
use docsift_core::store::{ContentProvider, ResultStore, WordCloudRenderer, WordCloudStore};

use crate::config::{Config, ContentConfig};
use crate::content_fs::FsContentProvider;
use crate::retry::RetryingContentProvider;
use crate::sqlite_store::SqliteResultStore;
use crate::wordcloud::{new_location, FsWordCloudStore, HttpWordCloudRenderer};

/// Limits applied to content fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Upper bound on a single content fetch (target or corpus).
    pub fetch_timeout: Duration,
    /// Corpus documents fetched at once.
    pub max_concurrent_fetches: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
            max_concurrent_fetches: 8,
        }
    }
}

impl EngineOptions {
    pub fn from_config(content: &ContentConfig) -> Self {
        Self {
            fetch_timeout: content.fetch_timeout(),
            max_concurrent_fetches: content.max_concurrent_fetches,
        }
    }
}

pub struct AnalysisEngine {
    results: Arc<dyn ResultStore>,
    content: Arc<dyn ContentProvider>,
    renderer: Arc<dyn WordCloudRenderer>,
    images: Arc<dyn WordCloudStore>,
    detector: SimilarityDetector,
    options: EngineOptions,
}

impl AnalysisEngine {
    pub fn new(
        results: Arc<dyn ResultStore>,
        content: Arc<dyn ContentProvider>,
        renderer: Arc<dyn WordCloudRenderer>,
        images: Arc<dyn WordCloudStore>,
        detector: SimilarityDetector,
        options: EngineOptions,
    ) -> Self {
        Self {
            results,
            content,
            renderer,
            images,
            detector,
            options,
        }
    }

    /// Wire the engine against SQLite, the content directory, and the
    /// configured word-cloud API and image directory.
    pub fn from_config(config: &Config, pool: SqlitePool) -> anyhow::Result<Self> {
        let normalizer = LexicalNormalizer::new(config.normalizer.stop_words());
        let detector = SimilarityDetector::new(normalizer, config.similarity);

        let content = RetryingContentProvider::new(
            FsContentProvider::new(config.content.root.clone()),
            config.retry.policy(),
        );
        let renderer = HttpWordCloudRenderer::new(&config.wordcloud, config.retry.policy())?;
        let images = FsWordCloudStore::new(config.wordcloud.storage_path.clone())?;

        Ok(Self::new(
            Arc::new(SqliteResultStore::new(pool)),
            Arc::new(content),
            Arc::new(renderer),
            Arc::new(images),
            detector,
            EngineOptions::from_config(&config.content),
        ))
    }

    /// Analyze `document_id`, or return its stored result if it was
    /// analyzed before.
    pub async fn analyze_document(
        &self,
        document_id: &str,
        generate_word_cloud: bool,
        cancel: &CancellationToken,
    ) -> Result<AnalysisReport, AnalysisError> {
        if document_id.trim().is_empty() {
            return Err(AnalysisError::Invalid(
                "document id must not be empty".to_string(),
            ));
        }

        let stored = race(cancel, self.results.get_result(document_id))
            .await?
            .map_err(|e| AnalysisError::upstream(format!("read result for {document_id}"), e))?;
        if let Some(result) = stored {
            debug!(document_id, "serving stored result");
            return self.stored_report(document_id, result, cancel).await;
        }

        info!(document_id, generate_word_cloud, "analyzing document");

        let target = self.fetch_target(document_id, cancel).await?;
        let stats = self.detector.normalizer().analyze_bytes(&target.bytes);
        let text = decode(&target.bytes);

        let listed = race(cancel, self.results.list_document_ids())
            .await?
            .map_err(|e| AnalysisError::upstream("list documents", e))?;
        let corpus = self.fetch_corpus(document_id, listed, cancel).await?;

        let verdict = self.detector.compare(&text, &corpus);
        debug!(
            document_id,
            corpus = corpus.len(),
            matches = verdict.matching_ids.len(),
            "compared against corpus"
        );

        let word_cloud_location = if generate_word_cloud {
            self.generate_word_cloud(document_id, &text, cancel).await?
        } else {
            None
        };

        let result = AnalysisResult {
            stats,
            is_plagiarism: verdict.is_match,
            word_cloud_location,
        };
        race(cancel, self.results.save_result(document_id, &result))
            .await?
            .map_err(|e| AnalysisError::internal(format!("save result for {document_id}"), e))?;

        for similar_id in &verdict.matching_ids {
            let saved =
                race(cancel, self.results.save_similar_edge(document_id, similar_id)).await?;
            if let Err(e) = saved {
                warn!(
                    document_id,
                    similar_id = %similar_id,
                    error = %e,
                    "failed to save similarity edge"
                );
            }
        }

        info!(
            document_id,
            paragraphs = stats.paragraph_count,
            words = stats.word_count,
            characters = stats.character_count,
            is_plagiarism = result.is_plagiarism,
            "analysis complete"
        );

        Ok(AnalysisReport {
            document_id: document_id.to_string(),
            stats,
            is_plagiarism: result.is_plagiarism,
            similar_ids: verdict.matching_ids.into_iter().collect(),
            word_cloud_location: result.word_cloud_location,
            cached: false,
        })
    }

    /// Bytes of a previously rendered word cloud.
    pub async fn get_word_cloud(
        &self,
        location: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, AnalysisError> {
        if location.trim().is_empty() {
            return Err(AnalysisError::Invalid(
                "word cloud location must not be empty".to_string(),
            ));
        }

        match race(cancel, self.images.get(location)).await? {
            Ok(Some(image)) => Ok(image),
            Ok(None) => Err(AnalysisError::NotFound(format!("word cloud {location}"))),
            Err(e) => Err(AnalysisError::from_collaborator(
                format!("read word cloud {location}"),
                e,
            )),
        }
    }

    async fn stored_report(
        &self,
        document_id: &str,
        result: AnalysisResult,
        cancel: &CancellationToken,
    ) -> Result<AnalysisReport, AnalysisError> {
        let similar_ids = if result.is_plagiarism {
            let edges = race(cancel, self.results.get_similar_edges(document_id))
                .await?
                .map_err(|e| {
                    AnalysisError::upstream(format!("read similar documents for {document_id}"), e)
                })?;
            edges.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
        } else {
            Vec::new()
        };

        Ok(AnalysisReport {
            document_id: document_id.to_string(),
            stats: result.stats,
            is_plagiarism: result.is_plagiarism,
            similar_ids,
            word_cloud_location: result.word_cloud_location,
            cached: true,
        })
    }

    async fn fetch_target(
        &self,
        document_id: &str,
        cancel: &CancellationToken,
    ) -> Result<DocumentContent, AnalysisError> {
        let timeout = self.options.fetch_timeout;
        let fetched = race(
            cancel,
            tokio::time::timeout(timeout, self.content.get_content(document_id)),
        )
        .await?;

        match fetched {
            Ok(Ok(Some(content))) => Ok(content),
            Ok(Ok(None)) => Err(AnalysisError::NotFound(format!("document {document_id}"))),
            Ok(Err(e)) => Err(AnalysisError::from_collaborator(
                format!("fetch content for {document_id}"),
                e,
            )),
            Err(_) => Err(AnalysisError::upstream(
                format!("fetch content for {document_id}"),
                anyhow!("timed out after {:?}", timeout),
            )),
        }
    }

    /// Fetch every listed document except `target`. Documents that are
    /// missing, fail, or exceed the fetch timeout are skipped.
    async fn fetch_corpus(
        &self,
        target: &str,
        listed: Vec<String>,
        cancel: &CancellationToken,
    ) -> Result<HashMap<String, String>, AnalysisError> {
        let candidates: BTreeSet<String> = listed.into_iter().filter(|id| id != target).collect();
        let timeout = self.options.fetch_timeout;
        let provider = &self.content;

        let outcomes: Vec<_> = race(
            cancel,
            stream::iter(candidates)
                .map(move |id| async move {
                    let outcome = tokio::time::timeout(timeout, provider.get_content(&id)).await;
                    (id, outcome)
                })
                .buffer_unordered(self.options.max_concurrent_fetches.max(1))
                .collect::<Vec<_>>(),
        )
        .await?;

        let mut corpus = HashMap::with_capacity(outcomes.len());
        for (id, outcome) in outcomes {
            match outcome {
                Ok(Ok(Some(content))) => {
                    corpus.insert(id, decode(&content.bytes).into_owned());
                }
                Ok(Ok(None)) => {
                    warn!(document_id = %id, "corpus document has no content, skipping");
                }
                Ok(Err(e)) => {
                    warn!(document_id = %id, error = %e, "corpus fetch failed, skipping");
                }
                Err(_) => {
                    warn!(
                        document_id = %id,
                        timeout = ?timeout,
                        "corpus fetch timed out, skipping"
                    );
                }
            }
        }

        Ok(corpus)
    }

    /// Render and store a word cloud of the document's significant words.
    /// Failures are logged and yield `None`; only cancellation is an error.
    async fn generate_word_cloud(
        &self,
        document_id: &str,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, AnalysisError> {
        let words = self.detector.normalizer().significant_words(text).join(" ");

        let image = match race(cancel, self.renderer.render(&words)).await? {
            Ok(image) => image,
            Err(e) => {
                warn!(document_id, error = %e, "word cloud rendering failed");
                return Ok(None);
            }
        };

        let location = new_location();
        match race(cancel, self.images.save(&location, &image)).await? {
            Ok(()) => {
                debug!(document_id, location = %location, "word cloud stored");
                Ok(Some(location))
            }
            Err(e) => {
                warn!(document_id, error = %e, "failed to store word cloud");
                Ok(None)
            }
        }
    }
}

/// Run `fut` unless `cancel` fires first.
async fn race<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output, AnalysisError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AnalysisError::Cancelled),
        output = fut => Ok(output),
    }
}
