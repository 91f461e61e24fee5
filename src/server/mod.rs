//! HTTP server layer for Image Relay.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │    POST /v1/generate_images        GET /proxy-image?url=...     │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │    index    │  │        routes           │  │
//! │  │ (requests)  │  │   (HTML)    │  │  (router config)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod index;
pub mod routes;

pub use handlers::{
    generate_images_handler, health_handler, index_handler, proxy_image_handler, ApiError,
    AppState, ErrorResponse, GenerateImagesPayload, GenerateImagesResponse, HealthResponse,
    ProxyImageQuery,
};
pub use routes::{create_router, RouterConfig};
