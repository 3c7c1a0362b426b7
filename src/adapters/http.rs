//! HTTP resource loader.
//!
//! Warms a remote resource by fetching its leading bytes with a ranged GET.
//! The body is read chunk by chunk and the connection is dropped once
//! `prefetch_bytes` have arrived, even if the server ignored `Range`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::RANGE;

use super::ResourceLoader;

/// Ranged-GET loader for `http(s)://` resources
pub struct HttpLoader {
    client: reqwest::Client,

    /// Bytes to fetch per resource (0 = whole resource)
    prefetch_bytes: u64,
}

impl HttpLoader {
    pub fn new(prefetch_bytes: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("feedgrid/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            prefetch_bytes,
        })
    }

    /// Value of the `Range` header, if any
    fn range_header(&self) -> Option<String> {
        (self.prefetch_bytes > 0).then(|| format!("bytes=0-{}", self.prefetch_bytes - 1))
    }

    /// Read the leading bytes of `key`, returning how many were kept
    async fn fetch(&self, key: &str) -> Result<u64> {
        let mut request = self.client.get(key);
        if let Some(range) = self.range_header() {
            request = request.header(RANGE, range);
        }

        let mut response = request
            .send()
            .await
            .with_context(|| format!("Failed to request {}", key))?
            .error_for_status()
            .with_context(|| format!("Server rejected {}", key))?;

        let mut read: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .with_context(|| format!("Failed to read body of {}", key))?
        {
            read += chunk.len() as u64;
            if self.prefetch_bytes > 0 && read >= self.prefetch_bytes {
                break;
            }
        }

        if self.prefetch_bytes > 0 {
            Ok(read.min(self.prefetch_bytes))
        } else {
            Ok(read)
        }
    }
}

#[async_trait]
impl ResourceLoader for HttpLoader {
    fn name(&self) -> &str {
        "http"
    }

    async fn load(&self, key: &str) -> Result<()> {
        let bytes = self.fetch(key).await?;
        tracing::debug!(url = key, bytes, "Prefetched remote resource");
        Ok(())
    }
}
