//! TOML configuration parsing and validation.
//!
//! Every section is optional; omitted sections and keys take the defaults
//! shown in `config/docsift.example.toml`.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use docsift_core::normalize::StopWords;
use docsift_core::similarity::SimilarityConfig;

use crate::retry::RetryPolicy;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub similarity: SimilarityConfig,
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    #[serde(default)]
    pub wordcloud: WordCloudConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/docsift.sqlite")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    #[serde(default = "default_content_root")]
    pub root: PathBuf,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: default_content_root(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

fn default_content_root() -> PathBuf {
    PathBuf::from("./data/documents")
}
fn default_fetch_timeout_secs() -> u64 {
    10
}
fn default_max_concurrent_fetches() -> usize {
    8
}

impl ContentConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct NormalizerConfig {
    /// Replaces the built-in English stop words when set.
    #[serde(default)]
    pub stop_words: Option<Vec<String>>,
}

impl NormalizerConfig {
    pub fn stop_words(&self) -> StopWords {
        match &self.stop_words {
            Some(words) => StopWords::new(words.iter().map(|w| w.to_lowercase())),
            None => StopWords::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WordCloudConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    #[serde(default = "default_image_size")]
    pub width: u32,
    #[serde(default = "default_image_size")]
    pub height: u32,
    #[serde(default = "default_render_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            storage_path: default_storage_path(),
            width: default_image_size(),
            height: default_image_size(),
            timeout_secs: default_render_timeout_secs(),
        }
    }
}

fn default_api_url() -> String {
    "https://quickchart.io/wordcloud".to_string()
}
fn default_storage_path() -> PathBuf {
    PathBuf::from("./data/wordclouds")
}
fn default_image_size() -> u32 {
    1024
}
fn default_render_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}
fn default_initial_delay_ms() -> u64 {
    1000
}
fn default_max_delay_ms() -> u64 {
    32_000
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.initial_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if !(0.0..=1.0).contains(&config.similarity.threshold) {
        bail!("similarity.threshold must be in [0.0, 1.0]");
    }
    if config.similarity.ngram_size == 0 {
        bail!("similarity.ngram_size must be >= 1");
    }

    if config.content.max_concurrent_fetches == 0 {
        bail!("content.max_concurrent_fetches must be >= 1");
    }
    if config.content.fetch_timeout_secs == 0 {
        bail!("content.fetch_timeout_secs must be >= 1");
    }

    if config.retry.max_attempts == 0 {
        bail!("retry.max_attempts must be >= 1");
    }
    if config.retry.initial_delay_ms > config.retry.max_delay_ms {
        bail!("retry.initial_delay_ms must not exceed retry.max_delay_ms");
    }

    if config.wordcloud.width == 0 || config.wordcloud.height == 0 {
        bail!("wordcloud.width and wordcloud.height must be > 0");
    }
    if config.wordcloud.api_url.trim().is_empty() {
        bail!("wordcloud.api_url must not be empty");
    }

    crate::logger::parse_level(&config.logging.level).context("logging.level")?;

    Ok(())
}
