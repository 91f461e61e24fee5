//! # Image Relay
//!
//! A thin backend that generates images through the OpenAI Images API and
//! proxies remote images back to the browser.
//!
//! ## Features
//!
//! - **Credential pool**: Discovers every `OPENAI_API_KEY[_N]` value, removes
//!   duplicates and spreads requests across them at random
//! - **Sequential dispatch**: One upstream call per requested image, since
//!   DALL·E 3 only returns one image per call
//! - **Image proxy**: Re-serves remote images from this origin to sidestep CORS
//!
//! ## Architecture
//!
//! - [`credentials`] - Credential discovery and selection
//! - [`generate`] - Validation, prompt building and dispatch
//! - [`upstream`] - Provider trait and OpenAI client
//! - [`proxy`] - Remote image fetching
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use image_relay::{
//!     create_router, AppState, CredentialPool, Dispatcher, HttpImageFetcher, OpenAiImageClient,
//!     RouterConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = Arc::new(CredentialPool::from_env("OPENAI_API_KEY")?);
//!     let provider = OpenAiImageClient::new("https://api.openai.com/v1", Duration::from_secs(120))?;
//!     let fetcher = HttpImageFetcher::new(Duration::from_secs(30))?;
//!
//!     let state = AppState::new(Dispatcher::new(pool, provider), fetcher);
//!     let router = create_router(state, RouterConfig::default());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod generate;
pub mod proxy;
pub mod server;
pub mod upstream;

// Re-export commonly used types
pub use config::Config;
pub use credentials::{Credential, CredentialPool, RandomSource, ThreadRandom};
pub use error::{ConfigError, GenerateError, ProxyError, UpstreamError, ValidationError};
pub use generate::{
    build_prompt, validate_request, Dispatcher, GenerateImagesBody, GenerationRequest, Keywords,
    Validation,
};
pub use proxy::{FetchedImage, HttpImageFetcher, ImageFetcher};
pub use server::{create_router, AppState, ErrorResponse, RouterConfig};
pub use upstream::{ImageGenerationCall, ImageProvider, OpenAiImageClient};
