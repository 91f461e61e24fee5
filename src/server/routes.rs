//! Router configuration for Image Relay.
//!
//! This module defines the HTTP routes and applies middleware for CORS and
//! request tracing.
//!
//! # Route Structure
//!
//! ```text
//! /                        - Index page
//! /health                  - Health check
//! /v1/generate_images      - Image generation (POST)
//! /proxy-image?url=...     - Image proxy (GET)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use image_relay::credentials::CredentialPool;
//! use image_relay::generate::Dispatcher;
//! use image_relay::proxy::HttpImageFetcher;
//! use image_relay::server::{create_router, AppState, RouterConfig};
//! use image_relay::upstream::OpenAiImageClient;
//!
//! let pool = Arc::new(CredentialPool::from_env("OPENAI_API_KEY")?);
//! let provider = OpenAiImageClient::new("https://api.openai.com/v1", timeout)?;
//! let state = AppState::new(Dispatcher::new(pool, provider), HttpImageFetcher::new(timeout)?);
//!
//! let router = create_router(state, RouterConfig::default());
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    generate_images_handler, health_handler, index_handler, proxy_image_handler, AppState,
};
use crate::proxy::ImageFetcher;
use crate::upstream::ImageProvider;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    /// CORS allows any origin; tracing is enabled.
    fn default() -> Self {
        Self {
            cors_origins: None,
            enable_tracing: true,
        }
    }
}

impl RouterConfig {
    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
pub fn create_router<P, F>(state: AppState<P, F>, config: RouterConfig) -> Router
where
    P: ImageProvider + 'static,
    F: ImageFetcher + 'static,
{
    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler::<P, F>))
        .route("/v1/generate_images", post(generate_images_handler::<P, F>))
        .route("/proxy-image", get(proxy_image_handler::<P, F>))
        .with_state(state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
