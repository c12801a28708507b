//! Lexical normalizer: document statistics, significant-word extraction,
//! n-gram windows, and whitespace collapsing.
//!
//! Every function here is total: empty input, whitespace-only input and
//! arbitrary bytes (via [`decode`]) all produce a defined result.
//!
//! # Example
//!
//! ```rust
//! use docsift_core::normalize::LexicalNormalizer;
//!
//! let normalizer = LexicalNormalizer::default();
//! let stats = normalizer.analyze("Hello");
//! assert_eq!((stats.paragraph_count, stats.word_count, stats.character_count), (1, 1, 5));
//! assert_eq!(normalizer.significant_words("The cat, the hat."), vec!["cat", "hat"]);
//! ```

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::models::DocumentStats;

/// English closed-class function words excluded from significant words.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "is", "are", "was", "were", "be", "been", "in", "on",
    "at", "to", "for", "with", "by", "of", "about", "from", "this", "that", "these", "those", "it",
    "its", "it's", "they", "them", "their",
];

static PUNCTUATION_REGEX: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();

fn punctuation_regex() -> &'static Regex {
    PUNCTUATION_REGEX.get_or_init(|| Regex::new(r"\p{P}").expect("valid punctuation regex"))
}

fn whitespace_regex() -> &'static Regex {
    WHITESPACE_REGEX.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

/// Immutable stop-word set. Lookups are exact and case-sensitive; callers
/// lower-case tokens before checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// A set that filters nothing.
    pub fn empty() -> Self {
        Self {
            words: HashSet::new(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::new(DEFAULT_STOP_WORDS.iter().copied())
    }
}

/// Tokenizer and statistics engine, parameterized by its stop words.
///
/// Two normalizers with different stop words can coexist; nothing here
/// touches global state.
#[derive(Debug, Clone, Default)]
pub struct LexicalNormalizer {
    stop_words: StopWords,
}

impl LexicalNormalizer {
    pub fn new(stop_words: StopWords) -> Self {
        Self { stop_words }
    }

    /// Paragraph, word and character counts for `text`.
    ///
    /// - Paragraphs are segments separated by `"\n\n"` that are non-blank
    ///   after trimming.
    /// - Words are whitespace-delimited tokens, punctuation included.
    /// - Characters are the raw byte length of the input.
    pub fn analyze(&self, text: &str) -> DocumentStats {
        let paragraph_count = text
            .split("\n\n")
            .filter(|p| !p.trim().is_empty())
            .count();
        let word_count = text.split_whitespace().count();

        DocumentStats {
            paragraph_count: saturate(paragraph_count),
            word_count: saturate(word_count),
            character_count: saturate(text.len()),
        }
    }

    /// [`analyze`](Self::analyze) over raw document bytes. Words and
    /// paragraphs come from the lossily decoded text; `character_count` is
    /// the length of `bytes` itself, so invalid UTF-8 is not inflated by
    /// replacement characters.
    pub fn analyze_bytes(&self, bytes: &[u8]) -> DocumentStats {
        let mut stats = self.analyze(&decode(bytes));
        stats.character_count = saturate(bytes.len());
        stats
    }

    /// Lower-cased, punctuation-free tokens with stop words removed.
    /// Order and duplicates are preserved.
    pub fn significant_words(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let stripped = punctuation_regex().replace_all(&lowered, " ");
        stripped
            .split_whitespace()
            .filter(|w| !self.stop_words.contains(w))
            .map(str::to_string)
            .collect()
    }

    /// Space-joined windows of `n` consecutive raw whitespace tokens.
    ///
    /// Returns an empty vector when there are fewer than `n` tokens or
    /// `n` is zero.
    pub fn ngrams(&self, text: &str, n: usize) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if n == 0 || words.len() < n {
            return Vec::new();
        }
        words.windows(n).map(|w| w.join(" ")).collect()
    }

    /// Collapse every run of whitespace into one space. Leading and trailing
    /// runs become a single space rather than being trimmed.
    pub fn normalize_whitespace(&self, text: &str) -> String {
        whitespace_regex().replace_all(text, " ").into_owned()
    }

    /// Significant words joined by single spaces, whitespace-normalized.
    /// This is the form the similarity detector fingerprints.
    pub fn normalized_text(&self, text: &str) -> String {
        let joined = self.significant_words(text).join(" ");
        self.normalize_whitespace(&joined)
    }

    /// Significant-word counts, most frequent first, ties broken by word.
    pub fn word_frequencies(&self, text: &str) -> Vec<(String, usize)> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for word in self.significant_words(text) {
            *counts.entry(word).or_insert(0) += 1;
        }
        let mut freqs: Vec<(String, usize)> = counts.into_iter().collect();
        freqs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        freqs
    }
}

/// Decode raw document bytes, replacing invalid UTF-8 with U+FFFD.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

fn saturate(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> LexicalNormalizer {
        LexicalNormalizer::default()
    }

    #[test]
    fn test_analyze_empty() {
        assert_eq!(normalizer().analyze(""), DocumentStats::new(0, 0, 0));
    }

    #[test]
    fn test_analyze_single_word() {
        assert_eq!(normalizer().analyze("Hello"), DocumentStats::new(1, 1, 5));
    }

    #[test]
    fn test_analyze_three_paragraphs() {
        let text = "This is the first paragraph.\n\nThis is the second paragraph.\n\nAnd this is the third.";
        assert_eq!(normalizer().analyze(text), DocumentStats::new(3, 15, 83));
    }

    #[test]
    fn test_analyze_skips_blank_paragraphs() {
        let text = "\n\nOne\n\n   \n\n\n\nTwo\n\n";
        let stats = normalizer().analyze(text);
        assert_eq!(stats.paragraph_count, 2);
        assert_eq!(stats.word_count, 2);
        assert_eq!(stats.character_count, text.len() as u32);
    }

    #[test]
    fn test_analyze_whitespace_only() {
        let stats = normalizer().analyze(" \t\n ");
        assert_eq!(stats.paragraph_count, 0);
        assert_eq!(stats.word_count, 0);
        assert_eq!(stats.character_count, 4);
    }

    #[test]
    fn test_paragraphs_bounded_by_segments() {
        let texts = ["a\n\nb\n\nc", "a\nb\nc", "\n\n\n\n", "x\n\n\n\ny"];
        for t in texts {
            let segments = t.split("\n\n").count() as u32;
            assert!(normalizer().analyze(t).paragraph_count <= segments, "{:?}", t);
        }
    }

    #[test]
    fn test_significant_words_strips_stop_words_and_punctuation() {
        let words = normalizer().significant_words("This is a test document for plagiarism detection.");
        assert_eq!(words, vec!["test", "document", "plagiarism", "detection"]);
    }

    #[test]
    fn test_significant_words_preserves_order_and_duplicates() {
        let words = normalizer().significant_words("Rust! rust? RUST; the end");
        assert_eq!(words, vec!["rust", "rust", "rust", "end"]);
    }

    #[test]
    fn test_significant_words_unicode_punctuation() {
        let words = normalizer().significant_words("«Bonjour»—monde…");
        assert_eq!(words, vec!["bonjour", "monde"]);
    }

    #[test]
    fn test_apostrophe_is_split() {
        // Punctuation is replaced before stop-word filtering, so "it's"
        // becomes "it" + "s"; only "it" is a stop word.
        let words = normalizer().significant_words("It's fine");
        assert_eq!(words, vec!["s", "fine"]);
    }

    #[test]
    fn test_analyze_bytes_counts_raw_length() {
        let stats = normalizer().analyze_bytes(&[b'a', 0xff, b'b']);
        assert_eq!(stats, DocumentStats::new(1, 1, 3));
        // Lossy decoding alone would report 5 (U+FFFD is 3 bytes).
        assert_eq!(normalizer().analyze(&decode(&[b'a', 0xff, b'b'])).character_count, 5);
    }

    #[test]
    fn test_custom_stop_words() {
        let n = LexicalNormalizer::new(StopWords::new(["hello"]));
        assert_eq!(n.significant_words("Hello the world"), vec!["the", "world"]);
        let none = LexicalNormalizer::new(StopWords::empty());
        assert_eq!(none.significant_words("a b"), vec!["a", "b"]);
    }

    #[test]
    fn test_ngrams_counts() {
        let n = normalizer();
        assert!(n.ngrams("one two", 3).is_empty());
        assert!(n.ngrams("", 1).is_empty());
        assert!(n.ngrams("one two three", 0).is_empty());

        let grams = n.ngrams("one two three four five", 3);
        assert_eq!(grams.len(), 5 - 3 + 1);
        assert_eq!(grams[0], "one two three");
        assert_eq!(grams[2], "three four five");
    }

    #[test]
    fn test_ngrams_use_raw_tokens() {
        let grams = normalizer().ngrams("The  Cat,\tsat", 2);
        assert_eq!(grams, vec!["The Cat,", "Cat, sat"]);
    }

    #[test]
    fn test_normalize_whitespace_collapses_without_trimming() {
        let n = normalizer();
        assert_eq!(n.normalize_whitespace("a \t\n b"), "a b");
        assert_eq!(n.normalize_whitespace("  a  "), " a ");
        assert_eq!(n.normalize_whitespace(""), "");
    }

    #[test]
    fn test_word_frequencies_sorted() {
        // "a" is a stop word.
        let freqs = normalizer().word_frequencies("b a d b c a b d");
        assert_eq!(
            freqs,
            vec![
                ("b".to_string(), 3),
                ("d".to_string(), 2),
                ("c".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let text = decode(&[b'o', b'k', 0xff, b' ', b'x']);
        assert_eq!(text, "ok\u{fffd} x");
        let stats = normalizer().analyze(&text);
        assert_eq!(stats.word_count, 2);
    }
}
