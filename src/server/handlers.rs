//! HTTP request handlers for the Image Relay API.
//!
//! # Endpoints
//!
//! - `POST /v1/generate_images` - Generate images from keywords
//! - `GET /proxy-image?url=...` - Re-serve a remote image from this origin
//! - `GET /health` - Health check endpoint
//! - `GET /` - Index page

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Query, Request, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::{GenerateError, ProxyError, ValidationError};
use crate::generate::{validate_request, Dispatcher, GenerateImagesBody};
use crate::proxy::ImageFetcher;
use crate::upstream::ImageProvider;

use super::index::INDEX_HTML;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<P: ImageProvider, F: ImageFetcher> {
    /// Dispatcher holding the credential pool and upstream provider
    pub dispatcher: Dispatcher<P>,

    /// Fetcher used by the image proxy
    pub fetcher: Arc<F>,
}

impl<P: ImageProvider, F: ImageFetcher> AppState<P, F> {
    pub fn new(dispatcher: Dispatcher<P>, fetcher: F) -> Self {
        Self {
            dispatcher,
            fetcher: Arc::new(fetcher),
        }
    }
}

impl<P: ImageProvider, F: ImageFetcher> Clone for AppState<P, F> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Body of `POST /v1/generate_images`, decoded from JSON or form data.
///
/// Urlencoded and `multipart/form-data` bodies are read as ordered field
/// pairs, so repeated `keywords` fields collect into a list. Anything else is
/// read as JSON; an empty body or a bare `null` decodes to an empty request so
/// that validation reports the missing keywords.
#[derive(Debug)]
pub struct GenerateImagesPayload(pub GenerateImagesBody);

enum BodyKind {
    UrlEncoded,
    Multipart,
    Json,
}

fn body_kind(req: &Request) -> BodyKind {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if content_type.starts_with("application/x-www-form-urlencoded") {
        BodyKind::UrlEncoded
    } else if content_type.starts_with("multipart/form-data") {
        BodyKind::Multipart
    } else {
        BodyKind::Json
    }
}

impl<S> FromRequest<S> for GenerateImagesPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match body_kind(&req) {
            BodyKind::UrlEncoded => {
                let Form(fields) = Form::<Vec<(String, String)>>::from_request(req, state)
                    .await
                    .map_err(|e| ValidationError::InvalidBody(e.body_text()))?;
                Ok(Self(GenerateImagesBody::from_fields(fields)))
            }
            BodyKind::Multipart => {
                let mut multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| ValidationError::InvalidBody(e.body_text()))?;

                let mut fields = Vec::new();
                while let Some(field) = multipart
                    .next_field()
                    .await
                    .map_err(|e| ValidationError::InvalidBody(e.body_text()))?
                {
                    // File uploads are not request parameters.
                    if field.file_name().is_some() {
                        continue;
                    }
                    let Some(name) = field.name().map(str::to_string) else {
                        continue;
                    };
                    let value = field
                        .text()
                        .await
                        .map_err(|e| ValidationError::InvalidBody(e.body_text()))?;
                    fields.push((name, value));
                }
                Ok(Self(GenerateImagesBody::from_fields(fields)))
            }
            BodyKind::Json => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(|e| ValidationError::InvalidBody(e.body_text()))?;

                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return Ok(Self(GenerateImagesBody::default()));
                }

                let body: Option<GenerateImagesBody> = serde_json::from_slice(&bytes)
                    .map_err(|e| ValidationError::InvalidBody(e.to_string()))?;
                Ok(Self(body.unwrap_or_default()))
            }
        }
    }
}

/// Query parameters for the image proxy.
#[derive(Debug, Deserialize)]
pub struct ProxyImageQuery {
    /// Absolute URL of the image to fetch
    #[serde(default)]
    pub url: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error body returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Successful generation response.
#[derive(Debug, Serialize)]
pub struct GenerateImagesResponse {
    /// Image URLs in generation order
    pub images: Vec<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Number of distinct upstream credentials loaded
    pub credentials: usize,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Errors surfaced by handlers.
///
/// Validation failures become 400 responses; everything else is a 500 that
/// carries the underlying message.
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    Generate(GenerateError),
    Proxy(ProxyError),
}

impl ApiError {
    /// Status code and client-facing message.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::Generate(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::Proxy(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to proxy image: {}", err),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            error!(status = status.as_u16(), "Server error: {}", message);
        } else {
            warn!(status = status.as_u16(), "Client error: {}", message);
        }

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<GenerateError> for ApiError {
    fn from(err: GenerateError) -> Self {
        ApiError::Generate(err)
    }
}

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        ApiError::Proxy(err)
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle image generation requests.
///
/// # Endpoint
///
/// `POST /v1/generate_images`
///
/// # Body (JSON or form)
///
/// - `keywords`: array of strings or a single string (required)
/// - `size`: image size (default: `1024x1024`)
/// - `num_images`: 1-10, number or numeric string (default: 1)
///
/// # Response
///
/// - `200 OK`: `{"images": ["https://...", ...]}`
/// - `400 Bad Request`: `{"error": "No keywords provided"}` or
///   `{"error": "Number of images must be between 1 and 10"}`
/// - `500 Internal Server Error`: `{"error": "<message>"}`
pub async fn generate_images_handler<P, F>(
    State(state): State<AppState<P, F>>,
    GenerateImagesPayload(body): GenerateImagesPayload,
) -> Result<Json<GenerateImagesResponse>, ApiError>
where
    P: ImageProvider + 'static,
    F: ImageFetcher + 'static,
{
    let request = validate_request(body).into_result()?;
    let images = state.dispatcher.dispatch(&request).await?;
    Ok(Json(GenerateImagesResponse { images }))
}

/// Proxy a remote image so the browser can use it without CORS restrictions.
///
/// # Endpoint
///
/// `GET /proxy-image?url=<imageUrl>`
///
/// # Response
///
/// - `200 OK`: the remote bytes, with the remote `Content-Type`
///   (`image/png` when absent)
/// - `400 Bad Request`: `{"error": "No image URL provided"}`
/// - `500 Internal Server Error`: `{"error": "Failed to proxy image: ..."}`
pub async fn proxy_image_handler<P, F>(
    State(state): State<AppState<P, F>>,
    Query(query): Query<ProxyImageQuery>,
) -> Result<Response, ApiError>
where
    P: ImageProvider + 'static,
    F: ImageFetcher + 'static,
{
    let url = query
        .url
        .filter(|u| !u.is_empty())
        .ok_or(ValidationError::MissingImageUrl)?;

    let image = state.fetcher.fetch(&url).await?;
    let content_type = image.content_type_or_default().to_string();

    Ok(([(header::CONTENT_TYPE, content_type)], image.body).into_response())
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "credentials": 3
/// }
/// ```
pub async fn health_handler<P, F>(State(state): State<AppState<P, F>>) -> Json<HealthResponse>
where
    P: ImageProvider + 'static,
    F: ImageFetcher + 'static,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        credentials: state.dispatcher.pool().len(),
    })
}

/// Serve the index page.
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

// =============================================================================
// Tests
// =============================================================================
