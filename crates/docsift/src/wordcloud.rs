//! Word-cloud rendering and storage.
//!
//! - [`HttpWordCloudRenderer`] posts text to a QuickChart-compatible
//!   `/wordcloud` endpoint and returns the PNG bytes.
//! - [`FsWordCloudStore`] keeps rendered images as files under a base
//!   directory.
//!
//! The analysis engine picks image locations itself via [`new_location`];
//! neither the renderer nor the store chooses names.
//!
//! # Retry Strategy
//!
//! The renderer retries through its [`RetryPolicy`]:
//! - HTTP 429 and 5xx → retry
//! - other HTTP 4xx → fail immediately
//! - network errors → retry

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use docsift_core::store::{WordCloudRenderer, WordCloudStore};

use crate::config::WordCloudConfig;
use crate::content_fs::checked_file_name;
use crate::retry::{AttemptError, RetryPolicy};

/// Suffix of every generated image location.
pub const IMAGE_SUFFIX: &str = ".png";

/// A fresh, unique image location: `<uuid-v4>.png`.
pub fn new_location() -> String {
    format!("{}{}", Uuid::new_v4(), IMAGE_SUFFIX)
}

#[derive(Serialize)]
struct RenderRequest<'a> {
    width: u32,
    height: u32,
    text: &'a str,
    format: &'a str,
}

/// Renders word clouds through an HTTP API.
pub struct HttpWordCloudRenderer {
    client: reqwest::Client,
    api_url: String,
    width: u32,
    height: u32,
    policy: RetryPolicy,
}

impl HttpWordCloudRenderer {
    pub fn new(config: &WordCloudConfig, policy: RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            width: config.width,
            height: config.height,
            policy,
        })
    }

    async fn render_once(&self, text: &str) -> std::result::Result<Vec<u8>, AttemptError> {
        let body = RenderRequest {
            width: self.width,
            height: self.height,
            text,
            format: "png",
        };

        let response = self
            .client
            .post(&self.api_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AttemptError::Transient(e.into()))?;

        let status = response.status();
        if status.is_success() {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| AttemptError::Transient(e.into()))?;
            return Ok(bytes.to_vec());
        }

        let body_text = response.text().await.unwrap_or_default();
        let err = anyhow!("word cloud API error {}: {}", status, body_text);
        if status.as_u16() == 429 || status.is_server_error() {
            Err(AttemptError::Transient(err))
        } else {
            Err(AttemptError::Permanent(err))
        }
    }
}

#[async_trait]
impl WordCloudRenderer for HttpWordCloudRenderer {
    async fn render(&self, text: &str) -> Result<Vec<u8>> {
        let image = self
            .policy
            .run("render word cloud", || self.render_once(text))
            .await?;
        debug!(bytes = image.len(), "word cloud rendered");
        Ok(image)
    }
}

/// Stores images as `<base>/<location>`.
pub struct FsWordCloudStore {
    base: PathBuf,
}

impl FsWordCloudStore {
    /// Create the store, creating `base` if it does not exist.
    pub fn new(base: impl Into<PathBuf>) -> Result<Self> {
        let base = base.into();
        std::fs::create_dir_all(&base)
            .with_context(|| format!("Failed to create word cloud directory {}", base.display()))?;
        Ok(Self { base })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

#[async_trait]
impl WordCloudStore for FsWordCloudStore {
    async fn save(&self, location: &str, image: &[u8]) -> Result<()> {
        let path = self.base.join(checked_file_name(location)?);
        tokio::fs::write(&path, image)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    async fn get(&self, location: &str) -> Result<Option<Vec<u8>>> {
        let path = self.base.join(checked_file_name(location)?);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }
}
