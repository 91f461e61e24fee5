//! Server-side image fetching for the `/proxy-image` endpoint.
//!
//! Browsers cannot read pixels from cross-origin images on a canvas, so the
//! frontend loads generated images through this service instead.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use tracing::debug;

use crate::error::{ConfigError, ProxyError};

/// Content type served when the remote response does not declare one.
pub const DEFAULT_PROXY_CONTENT_TYPE: &str = "image/png";

/// Default timeout for proxied fetches.
pub const DEFAULT_PROXY_TIMEOUT_SECS: u64 = 30;

/// A fetched remote resource.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    /// `Content-Type` of the remote response, if present
    pub content_type: Option<String>,

    /// Response body
    pub body: Bytes,
}

impl FetchedImage {
    /// The content type to serve, falling back to `image/png`.
    pub fn content_type_or_default(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_PROXY_CONTENT_TYPE)
    }
}

/// Fetches remote images by URL.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, ProxyError>;
}

/// [`ImageFetcher`] backed by `reqwest`.
#[derive(Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, ProxyError> {
        debug!(url, "Proxying remote image");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProxyError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| ProxyError::Body(e.to_string()))?;

        Ok(FetchedImage { content_type, body })
    }
}
