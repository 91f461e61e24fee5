//! Turns a validated [`GenerationRequest`] into image URLs.

use std::sync::Arc;

use tracing::{debug, info};

use super::prompt::build_prompt;
use super::request::{GenerationRequest, MAX_IMAGE_COUNT, MIN_IMAGE_COUNT};
use crate::credentials::CredentialPool;
use crate::error::{GenerateError, UpstreamError};
use crate::upstream::{ImageGenerationCall, ImageProvider, DEFAULT_MODEL};

/// Images requested per upstream call. DALL·E 3 only accepts `n = 1`.
const IMAGES_PER_CALL: u8 = 1;

/// Dispatches generation requests to an [`ImageProvider`].
///
/// One credential is selected per dispatch and reused for every image in it.
/// Calls are issued sequentially; the first failure aborts the dispatch and
/// no partial result is returned.
pub struct Dispatcher<P: ImageProvider> {
    pool: Arc<CredentialPool>,
    provider: Arc<P>,
    model: String,
}

impl<P: ImageProvider> Dispatcher<P> {
    /// Create a dispatcher using the default model.
    pub fn new(pool: Arc<CredentialPool>, provider: P) -> Self {
        Self {
            pool,
            provider: Arc::new(provider),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Override the model name sent upstream.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn pool(&self) -> &CredentialPool {
        &self.pool
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate `request.image_count` images and return their URLs in call
    /// order.
    pub async fn dispatch(&self, request: &GenerationRequest) -> Result<Vec<String>, GenerateError> {
        if !(MIN_IMAGE_COUNT..=MAX_IMAGE_COUNT).contains(&request.image_count) {
            return Err(GenerateError::InvalidCount(request.image_count));
        }

        let prompt = build_prompt(&request.keywords)?;
        let credential = self.pool.select(None)?;

        info!(
            images = request.image_count,
            size = %request.size,
            prompt_len = prompt.len(),
            "Dispatching image generation"
        );

        let call = ImageGenerationCall {
            model: self.model.clone(),
            prompt,
            size: request.size.clone(),
            n: IMAGES_PER_CALL,
        };

        let mut images = Vec::with_capacity(usize::from(request.image_count));
        for index in 0..request.image_count {
            debug!(index, "Requesting image");
            let urls = self.provider.generate(credential, &call).await?;
            let url = urls.into_iter().next().ok_or_else(|| {
                UpstreamError::MalformedResponse("provider returned no image".to_string())
            })?;
            images.push(url);
        }

        Ok(images)
    }
}

impl<P: ImageProvider> Clone for Dispatcher<P> {
    fn clone(&self) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
            provider: Arc::clone(&self.provider),
            model: self.model.clone(),
        }
    }
}
