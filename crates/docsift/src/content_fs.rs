//! Filesystem [`ContentProvider`]: a document id is a file name under
//! a configured root directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

use docsift_core::error::InvalidName;
use docsift_core::models::DocumentContent;
use docsift_core::store::ContentProvider;

/// Reads `<root>/<document_id>`.
pub struct FsContentProvider {
    root: PathBuf,
}

impl FsContentProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

}

#[async_trait]
impl ContentProvider for FsContentProvider {
    async fn get_content(&self, document_id: &str) -> Result<Option<DocumentContent>> {
        let name = checked_file_name(document_id)?;
        let path = self.root.join(name);

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(DocumentContent {
                name: name.to_string(),
                bytes,
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }
}

/// Accept `name` only if it is a single, non-hidden path component.
pub(crate) fn checked_file_name(name: &str) -> std::result::Result<&str, InvalidName> {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\', '\0']) {
        return Err(InvalidName(name.to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_existing_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("essay.txt"), "Hello world").unwrap();
        let provider = FsContentProvider::new(tmp.path());

        let content = provider.get_content("essay.txt").await.unwrap().unwrap();
        assert_eq!(content.name, "essay.txt");
        assert_eq!(content.bytes, b"Hello world".to_vec());
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let provider = FsContentProvider::new(tmp.path());
        assert!(provider.get_content("absent.txt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let tmp = TempDir::new().unwrap();
        let provider = FsContentProvider::new(tmp.path());
        for id in ["../etc/passwd", "a/b", "..", ".hidden", ""] {
            let err = provider.get_content(id).await.unwrap_err();
            assert!(err.downcast_ref::<InvalidName>().is_some(), "{:?}", id);
        }
    }

    #[tokio::test]
    async fn test_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        let provider = FsContentProvider::new(tmp.path());
        assert!(provider.get_content("sub").await.is_err());
    }
}
