//! Collaborator abstractions for the analysis engine.
//!
//! The engine never touches a database, a filesystem or the network
//! directly. It is wired against these traits, enabling pluggable backends
//! (SQLite, local directories, HTTP renderers) and the in-memory fakes in
//! [`memory`] for tests.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.
//! "Not found" is reported as `Ok(None)`, never as an error, so callers can
//! distinguish absence from failure.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{AnalysisResult, DocumentContent};

/// Persistence for analysis results and similarity edges.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`save_result`](ResultStore::save_result) | Insert or replace the result for a document |
/// | [`get_result`](ResultStore::get_result) | Fetch a stored result |
/// | [`save_similar_edge`](ResultStore::save_similar_edge) | Record "document is similar to other" (idempotent) |
/// | [`get_similar_edges`](ResultStore::get_similar_edges) | List recorded similar documents |
/// | [`list_document_ids`](ResultStore::list_document_ids) | Enumerate analyzed documents |
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Upsert; the last write for an id wins.
    async fn save_result(&self, document_id: &str, result: &AnalysisResult) -> Result<()>;

    async fn get_result(&self, document_id: &str) -> Result<Option<AnalysisResult>>;

    /// Inserting an existing edge is a no-op, not an error.
    async fn save_similar_edge(&self, document_id: &str, similar_id: &str) -> Result<()>;

    async fn get_similar_edges(&self, document_id: &str) -> Result<Vec<String>>;

    async fn list_document_ids(&self) -> Result<Vec<String>>;
}

/// Source of raw document bytes.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn get_content(&self, document_id: &str) -> Result<Option<DocumentContent>>;
}

/// Renders a word-cloud image for a piece of text.
#[async_trait]
pub trait WordCloudRenderer: Send + Sync {
    async fn render(&self, text: &str) -> Result<Vec<u8>>;
}

/// Storage for rendered word-cloud images, keyed by location.
#[async_trait]
pub trait WordCloudStore: Send + Sync {
    async fn save(&self, location: &str, image: &[u8]) -> Result<()>;

    async fn get(&self, location: &str) -> Result<Option<Vec<u8>>>;
}
