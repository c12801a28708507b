//! Similarity detector: exact-hash fast path plus Jaccard similarity over
//! word n-gram sets.
//!
//! # Algorithm
//!
//! For the target and for every candidate in the corpus:
//!
//! 1. Normalize: significant words → join with single spaces →
//!    collapse whitespace.
//! 2. Fast path: SHA-256 of the normalized strings; equal digests match
//!    without building n-grams.
//! 3. Slow path: n-gram frequency maps (window `ngram_size`) over the
//!    normalized strings.
//! 4. Jaccard = |A ∩ B| / |A ∪ B| over the n-gram *sets* (counts ignored).
//!    An empty union scores `0.0`.
//! 5. The candidate matches iff the score is `>= threshold`.
//!
//! Lower thresholds and smaller windows catch paraphrased near-duplicates
//! at the cost of more false positives.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::normalize::LexicalNormalizer;

/// Tuning knobs for [`SimilarityDetector`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityConfig {
    /// Minimum Jaccard score for a slow-path match, in `[0.0, 1.0]`.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// N-gram window size in words (>= 1).
    #[serde(default = "default_ngram_size")]
    pub ngram_size: usize,
}

fn default_threshold() -> f64 {
    0.3
}
fn default_ngram_size() -> usize {
    3
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            ngram_size: default_ngram_size(),
        }
    }
}

/// Outcome of comparing one document against a corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimilarityVerdict {
    pub is_match: bool,
    pub matching_ids: BTreeSet<String>,
}

/// Precomputed comparison form of one document.
#[derive(Debug, Clone)]
pub struct Fingerprint {
    normalized: String,
    digest: [u8; 32],
    /// N-gram frequencies.
    ngrams: HashMap<String, usize>,
    /// Distinct n-grams, the set Jaccard is computed over.
    ngram_set: HashSet<String>,
}

impl Fingerprint {
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Distinct n-grams in this document.
    pub fn ngram_count(&self) -> usize {
        self.ngram_set.len()
    }

    /// Occurrences of `gram` in this document.
    pub fn frequency(&self, gram: &str) -> usize {
        self.ngrams.get(gram).copied().unwrap_or(0)
    }
}

/// Compares documents using the normalizer's significant-word form.
#[derive(Debug, Clone, Default)]
pub struct SimilarityDetector {
    normalizer: LexicalNormalizer,
    config: SimilarityConfig,
}

impl SimilarityDetector {
    pub fn new(normalizer: LexicalNormalizer, config: SimilarityConfig) -> Self {
        Self { normalizer, config }
    }

    pub fn config(&self) -> &SimilarityConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &LexicalNormalizer {
        &self.normalizer
    }

    pub fn fingerprint(&self, text: &str) -> Fingerprint {
        let normalized = self.normalizer.normalized_text(text);
        let digest: [u8; 32] = Sha256::digest(normalized.as_bytes()).into();
        let mut ngrams: HashMap<String, usize> = HashMap::new();
        for gram in self.normalizer.ngrams(&normalized, self.config.ngram_size) {
            *ngrams.entry(gram).or_insert(0) += 1;
        }
        let ngram_set = ngrams.keys().cloned().collect();
        Fingerprint {
            normalized,
            digest,
            ngrams,
            ngram_set,
        }
    }

    /// Compare `content` against every entry of `corpus` (id → text).
    ///
    /// `matching_ids` holds every matching id; the verdict does not depend
    /// on iteration order.
    pub fn compare(&self, content: &str, corpus: &HashMap<String, String>) -> SimilarityVerdict {
        let target = self.fingerprint(content);
        let matching_ids: BTreeSet<String> = corpus
            .iter()
            .filter(|(_, other)| self.matches(&target, other))
            .map(|(id, _)| id.clone())
            .collect();

        SimilarityVerdict {
            is_match: !matching_ids.is_empty(),
            matching_ids,
        }
    }

    /// Whether `candidate` text matches an already fingerprinted target.
    pub fn matches(&self, target: &Fingerprint, candidate: &str) -> bool {
        let normalized = self.normalizer.normalized_text(candidate);
        let digest: [u8; 32] = Sha256::digest(normalized.as_bytes()).into();
        if digest == target.digest {
            return true;
        }

        let candidate_set: HashSet<String> = self
            .normalizer
            .ngrams(&normalized, self.config.ngram_size)
            .into_iter()
            .collect();
        jaccard(&target.ngram_set, &candidate_set) >= self.config.threshold
    }

    /// Jaccard score of two documents' normalized n-gram sets.
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        let fa = self.fingerprint(a);
        let fb = self.fingerprint(b);
        fingerprint_similarity(&fa, &fb)
    }
}

/// Jaccard score of two fingerprints' n-gram sets.
pub fn fingerprint_similarity(a: &Fingerprint, b: &Fingerprint) -> f64 {
    jaccard(&a.ngram_set, &b.ngram_set)
}

/// |A ∩ B| / |A ∪ B|, or `0.0` when both sets are empty.
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}
