//! OpenAI Images API client.
//!
//! Issues `POST {base_url}/images/generations` with bearer authentication and
//! reads image URLs from the `data` array of the response.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ImageGenerationCall, ImageProvider};
use crate::credentials::Credential;
use crate::error::{ConfigError, UpstreamError};

/// Default API root.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default per-call timeout. Image generation routinely takes tens of seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
struct GenerationRequestBody<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    n: u8,
}

#[derive(Debug, Deserialize)]
struct GenerationResponseBody {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// =============================================================================
// Client
// =============================================================================

/// [`ImageProvider`] backed by the OpenAI Images API.
#[derive(Clone)]
pub struct OpenAiImageClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiImageClient {
    /// Create a client for the given API root (e.g. `https://api.openai.com/v1`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// The API root requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/images/generations", self.base_url)
    }
}

#[async_trait]
impl ImageProvider for OpenAiImageClient {
    async fn generate(
        &self,
        credential: &Credential,
        call: &ImageGenerationCall,
    ) -> Result<Vec<String>, UpstreamError> {
        let body = GenerationRequestBody {
            model: &call.model,
            prompt: &call.prompt,
            size: &call.size,
            n: call.n,
        };

        debug!(
            model = %call.model,
            size = %call.size,
            "Calling image generation endpoint"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: error_message(&bytes),
            });
        }

        parse_generation_response(&bytes)
    }
}

/// Extract image URLs from a successful response body.
fn parse_generation_response(body: &[u8]) -> Result<Vec<String>, UpstreamError> {
    let parsed: GenerationResponseBody = serde_json::from_slice(body)
        .map_err(|e| UpstreamError::MalformedResponse(e.to_string()))?;

    let urls: Vec<String> = parsed.data.into_iter().filter_map(|img| img.url).collect();
    if urls.is_empty() {
        return Err(UpstreamError::MalformedResponse(
            "response contained no image URL".to_string(),
        ));
    }

    Ok(urls)
}

/// Provider error message from an error body, falling back to the raw text.
fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                "empty response body".to_string()
            } else {
                text
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
