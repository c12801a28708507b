//! Retry with exponential backoff for collaborator calls.
//!
//! A [`RetryPolicy`] is a plain value owned by the collaborators that talk
//! to remote systems ([`RetryingContentProvider`], the HTTP word-cloud
//! renderer). The analysis engine never retries on its own.
//!
//! Backoff: `initial_delay × 2^(retry - 1)`, capped at `max_delay`.
//! With the defaults (3 attempts, 1s) that is 1s, 2s.

use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::warn;

use docsift_core::error::InvalidName;
use docsift_core::models::DocumentContent;
use docsift_core::store::ContentProvider;

/// Outcome of one failed attempt.
#[derive(Debug)]
pub enum AttemptError {
    /// Worth retrying: network failure, rate limiting, server error.
    Transient(anyhow::Error),
    /// Retrying cannot help: client error, malformed response.
    Permanent(anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` counts the first try; values below 1 are raised to 1.
    pub fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            max_delay,
        }
    }

    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let shift = retry.saturating_sub(1).min(16);
        self.initial_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// `what` names the operation in logs and in the final error.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, AttemptError>>,
    {
        let mut last_err = None;

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.delay_for(attempt - 1)).await;
            }

            match op().await {
                Ok(value) => return Ok(value),
                Err(AttemptError::Permanent(e)) => {
                    return Err(e.context(format!("{} failed", what)))
                }
                Err(AttemptError::Transient(e)) => {
                    if attempt < self.max_attempts {
                        warn!(operation = what, attempt, error = %e, "transient failure, retrying");
                    }
                    last_err = Some(e);
                }
            }
        }

        let err = last_err.unwrap_or_else(|| anyhow!("no attempts made"));
        Err(err.context(format!(
            "{} failed after {} attempts",
            what, self.max_attempts
        )))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(32))
    }
}

/// Wraps a [`ContentProvider`], retrying failed fetches per `policy`.
///
/// A missing document (`Ok(None)`) is an answer, not a failure, and is
/// returned immediately. So are failures [`classify`] marks permanent.
pub struct RetryingContentProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: ContentProvider> RetryingContentProvider<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: ContentProvider> ContentProvider for RetryingContentProvider<P> {
    async fn get_content(&self, document_id: &str) -> Result<Option<DocumentContent>> {
        let what = format!("fetch content for {}", document_id);
        self.policy
            .run(&what, || async {
                self.inner
                    .get_content(document_id)
                    .await
                    .map_err(classify)
            })
            .await
    }
}

/// Malformed names and paths that are directories fail the same way on
/// every attempt; everything else is assumed transient.
fn classify(err: anyhow::Error) -> AttemptError {
    let permanent = err.downcast_ref::<InvalidName>().is_some()
        || err
            .downcast_ref::<std::io::Error>()
            .is_some_and(|e| e.kind() == std::io::ErrorKind::IsADirectory);

    if permanent {
        AttemptError::Permanent(err)
    } else {
        AttemptError::Transient(err)
    }
}
