//! Local filesystem resource loader.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use super::ResourceLoader;

/// Reads the leading bytes of a local file so the OS page cache holds them
#[derive(Debug, Clone)]
pub struct FileLoader {
    /// Bytes to read per resource (0 = whole file)
    prefetch_bytes: u64,
}

impl FileLoader {
    pub fn new(prefetch_bytes: u64) -> Self {
        Self { prefetch_bytes }
    }

    /// Strip an optional `file://` prefix
    fn path_for(key: &str) -> PathBuf {
        PathBuf::from(key.strip_prefix("file://").unwrap_or(key))
    }
}

#[async_trait]
impl ResourceLoader for FileLoader {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self, key: &str) -> Result<()> {
        let path = Self::path_for(key);
        let file = File::open(&path)
            .await
            .with_context(|| format!("Failed to open resource: {}", path.display()))?;

        let mut buf = Vec::new();
        let read = if self.prefetch_bytes > 0 {
            file.take(self.prefetch_bytes).read_to_end(&mut buf).await
        } else {
            let mut file = file;
            file.read_to_end(&mut buf).await
        }
        .with_context(|| format!("Failed to read resource: {}", path.display()))?;

        tracing::debug!(path = %path.display(), bytes = read, "Prefetched local resource");
        Ok(())
    }
}
