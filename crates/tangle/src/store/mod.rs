//! File-backed cache for named JSON blobs.
//!
//! The engine persists its collections ("issues", "graphs") through the
//! [`DataStore`] trait. A cache miss is ordinary control flow — the engine
//! falls back to fetching — so `read` returns `Option` rather than an error
//! for missing entries.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;

/// Persistence boundary for named JSON collections.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Read a named blob. Returns `None` when the entry does not exist.
    async fn read(&self, name: &str) -> Result<Option<Value>>;

    /// Write a named blob, creating the store directory if needed.
    async fn write(&self, name: &str, data: &Value) -> Result<()>;

    /// Delete a named blob. Deleting a missing entry is not an error.
    async fn delete(&self, name: &str) -> Result<()>;
}

/// A [`DataStore`] keeping each collection in `<root>/<name>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }
}

#[async_trait]
impl DataStore for FileStore {
    async fn read(&self, name: &str) -> Result<Option<Value>> {
        let path = self.file_path(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!(name, path = %path.display(), "cache hit");
                Ok(Some(serde_json::from_slice(&bytes)?))
            }
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
                ) =>
            {
                debug!(name, "cache miss");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn write(&self, name: &str, data: &Value) -> Result<()> {
        let path = self.file_path(name);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let mut contents = serde_json::to_vec_pretty(data)?;
        contents.push(b'\n');
        tokio::fs::write(&path, contents).await?;
        debug!(name, path = %path.display(), "cache written");
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let path = self.file_path(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
