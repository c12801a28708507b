//! Error type surfaced by the analysis engine.
//!
//! Collaborators report failures as `anyhow::Error`; the engine maps them
//! onto an [`AnalysisError`] so callers can branch on [`ErrorKind`].

use thiserror::Error;

/// Coarse classification of an [`AnalysisError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    UpstreamUnavailable,
    Invalid,
    Internal,
    Cancelled,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("upstream unavailable: {context}: {source:#}")]
    UpstreamUnavailable {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid request: {0}")]
    Invalid(String),

    #[error("internal error: {context}: {source:#}")]
    Internal {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("operation cancelled")]
    Cancelled,
}

impl AnalysisError {
    pub fn upstream(context: impl Into<String>, source: anyhow::Error) -> Self {
        Self::UpstreamUnavailable {
            context: context.into(),
            source,
        }
    }

    pub fn internal(context: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Internal {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            Self::Invalid(_) => ErrorKind::Invalid,
            Self::Internal { .. } => ErrorKind::Internal,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

/// A document id or image location that cannot name a stored object.
///
/// Collaborators return it (inside their `anyhow::Error`) for input that
/// no retry can fix; the engine reports it as [`AnalysisError::Invalid`].
#[derive(Debug, Error)]
#[error("invalid name: {0:?}")]
pub struct InvalidName(pub String);

impl AnalysisError {
    /// `Invalid` if `err` carries an [`InvalidName`], otherwise
    /// `UpstreamUnavailable` with `context`.
    pub fn from_collaborator(context: impl Into<String>, err: anyhow::Error) -> Self {
        if err.downcast_ref::<InvalidName>().is_some() {
            Self::Invalid(format!("{:#}", err))
        } else {
            Self::upstream(context, err)
        }
    }
}
