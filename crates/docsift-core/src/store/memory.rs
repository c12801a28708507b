//! In-memory collaborator implementations for tests and embedding.
//!
//! Uses `HashMap`/`BTreeSet` behind `std::sync::RwLock` for thread safety.
//! Locks are held only for the duration of a single call. Each fake can be
//! told to fail specific operations so error paths of the engine can be
//! exercised without a real backend.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::models::{AnalysisResult, DocumentContent};

use super::{ContentProvider, ResultStore, WordCloudRenderer, WordCloudStore};

/// In-memory [`ResultStore`].
#[derive(Default)]
pub struct InMemoryResultStore {
    results: RwLock<HashMap<String, AnalysisResult>>,
    edges: RwLock<HashMap<String, BTreeSet<String>>>,
    extra_ids: RwLock<Vec<String>>,
    fail_list: RwLock<bool>,
    fail_save: RwLock<bool>,
    fail_edges_to: RwLock<HashSet<String>>,
    list_calls: AtomicUsize,
    save_calls: AtomicUsize,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `id` appear in [`list_document_ids`](ResultStore::list_document_ids)
    /// without a stored result.
    pub fn register_document(&self, id: &str) {
        self.extra_ids.write().unwrap().push(id.to_string());
    }

    pub fn set_fail_list(&self, fail: bool) {
        *self.fail_list.write().unwrap() = fail;
    }

    pub fn set_fail_save(&self, fail: bool) {
        *self.fail_save.write().unwrap() = fail;
    }

    /// Fail every edge write whose similar id is `similar_id`.
    pub fn fail_edges_to(&self, similar_id: &str) {
        self.fail_edges_to
            .write()
            .unwrap()
            .insert(similar_id.to_string());
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn result_count(&self) -> usize {
        self.results.read().unwrap().len()
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn save_result(&self, document_id: &str, result: &AnalysisResult) -> Result<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_save.read().unwrap() {
            bail!("result store unavailable");
        }
        self.results
            .write()
            .unwrap()
            .insert(document_id.to_string(), result.clone());
        Ok(())
    }

    async fn get_result(&self, document_id: &str) -> Result<Option<AnalysisResult>> {
        Ok(self.results.read().unwrap().get(document_id).cloned())
    }

    async fn save_similar_edge(&self, document_id: &str, similar_id: &str) -> Result<()> {
        if self.fail_edges_to.read().unwrap().contains(similar_id) {
            bail!("failed to save edge {} -> {}", document_id, similar_id);
        }
        self.edges
            .write()
            .unwrap()
            .entry(document_id.to_string())
            .or_default()
            .insert(similar_id.to_string());
        Ok(())
    }

    async fn get_similar_edges(&self, document_id: &str) -> Result<Vec<String>> {
        Ok(self
            .edges
            .read()
            .unwrap()
            .get(document_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_document_ids(&self) -> Result<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_list.read().unwrap() {
            bail!("document listing unavailable");
        }
        let mut ids: BTreeSet<String> = self.results.read().unwrap().keys().cloned().collect();
        ids.extend(self.extra_ids.read().unwrap().iter().cloned());
        Ok(ids.into_iter().collect())
    }
}

/// In-memory [`ContentProvider`] keyed by document id.
#[derive(Default)]
pub struct InMemoryContentProvider {
    docs: RwLock<HashMap<String, DocumentContent>>,
    failing: RwLock<HashSet<String>>,
    fetches: AtomicUsize,
}

impl InMemoryContentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: &str, text: &str) {
        self.insert_bytes(id, text.as_bytes());
    }

    pub fn insert_bytes(&self, id: &str, bytes: &[u8]) {
        self.docs.write().unwrap().insert(
            id.to_string(),
            DocumentContent {
                name: format!("{}.txt", id),
                bytes: bytes.to_vec(),
            },
        );
    }

    /// Make fetches of `id` return an error instead of content.
    pub fn fail(&self, id: &str) {
        self.failing.write().unwrap().insert(id.to_string());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentProvider for InMemoryContentProvider {
    async fn get_content(&self, document_id: &str) -> Result<Option<DocumentContent>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.read().unwrap().contains(document_id) {
            bail!("content backend error for {}", document_id);
        }
        Ok(self.docs.read().unwrap().get(document_id).cloned())
    }
}

/// [`WordCloudRenderer`] returning fixed bytes, or failing when built with
/// [`FixedRenderer::failing`].
pub struct FixedRenderer {
    image: Option<Vec<u8>>,
    inputs: RwLock<Vec<String>>,
}

impl FixedRenderer {
    pub fn new(image: &[u8]) -> Self {
        Self {
            image: Some(image.to_vec()),
            inputs: RwLock::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            image: None,
            inputs: RwLock::new(Vec::new()),
        }
    }

    /// Texts passed to [`render`](WordCloudRenderer::render), in call order.
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.read().unwrap().clone()
    }
}

#[async_trait]
impl WordCloudRenderer for FixedRenderer {
    async fn render(&self, text: &str) -> Result<Vec<u8>> {
        self.inputs.write().unwrap().push(text.to_string());
        match &self.image {
            Some(image) => Ok(image.clone()),
            None => bail!("word cloud renderer unavailable"),
        }
    }
}

/// In-memory [`WordCloudStore`].
#[derive(Default)]
pub struct InMemoryWordCloudStore {
    images: RwLock<HashMap<String, Vec<u8>>>,
    fail_save: RwLock<bool>,
}

impl InMemoryWordCloudStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_save(&self, fail: bool) {
        *self.fail_save.write().unwrap() = fail;
    }

    pub fn len(&self) -> usize {
        self.images.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl WordCloudStore for InMemoryWordCloudStore {
    async fn save(&self, location: &str, image: &[u8]) -> Result<()> {
        if *self.fail_save.read().unwrap() {
            bail!("word cloud store unavailable");
        }
        self.images
            .write()
            .unwrap()
            .insert(location.to_string(), image.to_vec());
        Ok(())
    }

    async fn get(&self, location: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.images.read().unwrap().get(location).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentStats;

    fn result(plagiarism: bool) -> AnalysisResult {
        AnalysisResult {
            stats: DocumentStats::new(1, 2, 3),
            is_plagiarism: plagiarism,
            word_cloud_location: None,
        }
    }

    #[tokio::test]
    async fn test_result_upsert_last_write_wins() {
        let store = InMemoryResultStore::new();
        store.save_result("a", &result(false)).await.unwrap();
        store.save_result("a", &result(true)).await.unwrap();
        assert_eq!(store.result_count(), 1);
        assert!(store.get_result("a").await.unwrap().unwrap().is_plagiarism);
        assert!(store.get_result("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_edges_are_idempotent_and_directional() {
        let store = InMemoryResultStore::new();
        store.save_similar_edge("a", "b").await.unwrap();
        store.save_similar_edge("a", "b").await.unwrap();
        assert_eq!(store.get_similar_edges("a").await.unwrap(), vec!["b"]);
        assert!(store.get_similar_edges("b").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listing_includes_registered_documents() {
        let store = InMemoryResultStore::new();
        store.save_result("b", &result(false)).await.unwrap();
        store.register_document("a");
        store.register_document("b");
        assert_eq!(store.list_document_ids().await.unwrap(), vec!["a", "b"]);
        store.set_fail_list(true);
        assert!(store.list_document_ids().await.is_err());
        assert_eq!(store.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_content_provider_failures() {
        let provider = InMemoryContentProvider::new();
        provider.insert("doc", "text");
        provider.fail("bad");
        assert_eq!(
            provider.get_content("doc").await.unwrap().unwrap().bytes,
            b"text".to_vec()
        );
        assert!(provider.get_content("none").await.unwrap().is_none());
        assert!(provider.get_content("bad").await.is_err());
        assert_eq!(provider.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_renderer_records_inputs() {
        let ok = FixedRenderer::new(b"png");
        assert_eq!(ok.render("words").await.unwrap(), b"png".to_vec());
        assert_eq!(ok.inputs(), vec!["words"]);
        assert!(FixedRenderer::failing().render("x").await.is_err());
    }
}
