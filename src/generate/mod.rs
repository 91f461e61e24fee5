//! Image request dispatch.
//!
//! # Architecture
//!
//! ```text
//! GenerateImagesBody ──validate_request──▶ GenerationRequest
//!                                              │
//!                                   Dispatcher::dispatch
//!                                              │
//!                 build_prompt ─▶ CredentialPool::select ─▶ ImageProvider × N
//! ```

mod dispatcher;
mod prompt;
mod request;

pub use dispatcher::Dispatcher;
pub use prompt::{build_prompt, Keywords};
pub use request::{
    validate_request, GenerateImagesBody, GenerationRequest, ImageCountInput, Validation,
    DEFAULT_IMAGE_SIZE, MAX_IMAGE_COUNT, MIN_IMAGE_COUNT,
};
