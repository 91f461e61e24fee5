//! Upstream image-generation provider.
//!
//! The [`ImageProvider`] trait is the seam between the dispatcher and the
//! network. [`OpenAiImageClient`] talks to the OpenAI Images API; tests
//! substitute their own implementation.

mod openai;

pub use openai::{OpenAiImageClient, DEFAULT_OPENAI_BASE_URL, DEFAULT_UPSTREAM_TIMEOUT_SECS};

use async_trait::async_trait;

use crate::credentials::Credential;
use crate::error::UpstreamError;

/// Default model used for generation.
pub const DEFAULT_MODEL: &str = "dall-e-3";

/// One upstream "generate image" call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageGenerationCall {
    pub model: String,
    pub prompt: String,
    pub size: String,
    /// Images per call. The dispatcher always sends 1 because DALL·E 3
    /// produces a single image per request.
    pub n: u8,
}

/// A provider able to turn a prompt into image URLs.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Issue one generation call and return the image URLs in the order the
    /// provider listed them.
    async fn generate(
        &self,
        credential: &Credential,
        call: &ImageGenerationCall,
    ) -> Result<Vec<String>, UpstreamError>;
}
