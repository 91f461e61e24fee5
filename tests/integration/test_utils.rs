//! Test utilities for integration tests.
//!
//! Mock providers and fetchers that record calls, plus helpers for building
//! routers and reading JSON bodies.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;

use image_relay::credentials::{Credential, CredentialPool, RandomSource};
use image_relay::error::{ProxyError, UpstreamError};
use image_relay::generate::Dispatcher;
use image_relay::proxy::{FetchedImage, ImageFetcher};
use image_relay::server::{create_router, AppState, RouterConfig};
use image_relay::upstream::{ImageGenerationCall, ImageProvider};

// =============================================================================
// Mock Image Provider
// =============================================================================

/// A provider that records every call and returns numbered URLs.
#[derive(Clone, Default)]
pub struct MockProvider {
    calls: Arc<Mutex<Vec<(String, ImageGenerationCall)>>>,
    failure: Option<UpstreamError>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with the given error.
    pub fn failing(err: UpstreamError) -> Self {
        Self {
            failure: Some(err),
            ..Self::default()
        }
    }

    /// Calls seen so far as (credential, call) pairs.
    pub fn calls(&self) -> Vec<(String, ImageGenerationCall)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageProvider for MockProvider {
    async fn generate(
        &self,
        credential: &Credential,
        call: &ImageGenerationCall,
    ) -> Result<Vec<String>, UpstreamError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((credential.expose().to_string(), call.clone()));
            calls.len() - 1
        };

        if let Some(ref err) = self.failure {
            return Err(err.clone());
        }
        Ok(vec![format!("https://images.test/{}.png", index)])
    }
}

// =============================================================================
// Mock Image Fetcher
// =============================================================================

/// A fetcher serving pre-configured responses keyed by URL.
#[derive(Clone, Default)]
pub struct MockFetcher {
    images: HashMap<String, FetchedImage>,
    requests: Arc<AtomicUsize>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(
        mut self,
        url: impl Into<String>,
        content_type: Option<&str>,
        body: &'static [u8],
    ) -> Self {
        self.images.insert(
            url.into(),
            FetchedImage {
                content_type: content_type.map(str::to_string),
                body: Bytes::from_static(body),
            },
        );
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, ProxyError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.images
            .get(url)
            .cloned()
            .ok_or(ProxyError::Status(404))
    }
}

// =============================================================================
// Deterministic Randomness
// =============================================================================

/// Always picks the same index.
pub struct FixedRandom(pub usize);

impl RandomSource for FixedRandom {
    fn pick(&self, _len: usize) -> usize {
        self.0
    }
}

// =============================================================================
// Builders and Helpers
// =============================================================================

pub fn pool_of(keys: &[&str]) -> Arc<CredentialPool> {
    Arc::new(
        CredentialPool::from_credentials("OPENAI_API_KEY", keys.iter().map(|k| Credential::new(*k)))
            .unwrap(),
    )
}

/// Router wired to the given mocks with tracing disabled.
pub fn router_with(provider: MockProvider, fetcher: MockFetcher) -> Router {
    let dispatcher = Dispatcher::new(pool_of(&["sk-test-1"]), provider);
    let state = AppState::new(dispatcher, fetcher);
    create_router(state, RouterConfig::default().with_tracing(false))
}

pub fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Serve a router on an ephemeral local port and return its address.
pub async fn spawn_server(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
