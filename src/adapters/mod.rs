//! Resource loaders used to warm media before playback.
//!
//! The preload cache never fetches anything itself; it delegates to a
//! [`ResourceLoader`]. Loader errors are reported to the cache, which logs
//! them and marks the resource ready anyway.

pub mod file;
pub mod http;

use anyhow::Result;
use async_trait::async_trait;

pub use file::FileLoader;
pub use http::HttpLoader;

/// Trait for resource warm-up backends
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    /// Human-readable loader name
    fn name(&self) -> &str;

    /// Fetch enough of `key` that playback can start without a cold start
    async fn load(&self, key: &str) -> Result<()>;
}

/// Loader that does nothing (offline runs and tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLoader;

#[async_trait]
impl ResourceLoader for NoopLoader {
    fn name(&self) -> &str {
        "noop"
    }

    async fn load(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

/// Dispatches by URL scheme: `http(s)://` goes over HTTP, everything else is
/// read from the local filesystem.
pub struct SchemeLoader {
    http: HttpLoader,
    file: FileLoader,
}

impl SchemeLoader {
    pub fn new(prefetch_bytes: u64) -> Result<Self> {
        Ok(Self {
            http: HttpLoader::new(prefetch_bytes)?,
            file: FileLoader::new(prefetch_bytes),
        })
    }

    fn route(&self, key: &str) -> &dyn ResourceLoader {
        let lower = key.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            &self.http
        } else {
            &self.file
        }
    }
}

#[async_trait]
impl ResourceLoader for SchemeLoader {
    fn name(&self) -> &str {
        "scheme"
    }

    async fn load(&self, key: &str) -> Result<()> {
        self.route(key).load(key).await
    }
}
