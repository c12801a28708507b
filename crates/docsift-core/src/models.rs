//! Core data models shared by the normalizer, the detector, the stores,
//! and the analysis engine.

use serde::Serialize;

/// Structural statistics for one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub paragraph_count: u32,
    pub word_count: u32,
    pub character_count: u32,
}

impl DocumentStats {
    pub fn new(paragraph_count: u32, word_count: u32, character_count: u32) -> Self {
        Self {
            paragraph_count,
            word_count,
            character_count,
        }
    }
}

/// Persisted outcome of analyzing a document. At most one per document id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub stats: DocumentStats,
    pub is_plagiarism: bool,
    /// `None` when no word cloud was requested or generation failed.
    pub word_cloud_location: Option<String>,
}

/// Raw document returned by a content provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentContent {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Response of `analyze_document`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub document_id: String,
    pub stats: DocumentStats,
    pub is_plagiarism: bool,
    /// Sorted ids of similar documents (empty unless `is_plagiarism`).
    pub similar_ids: Vec<String>,
    pub word_cloud_location: Option<String>,
    /// True when the report was served from a stored result.
    pub cached: bool,
}
