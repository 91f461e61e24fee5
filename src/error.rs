use thiserror::Error;

/// Errors raised while assembling the service configuration at startup.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// No credential resolved to a non-empty value
    #[error("No credentials found: set {prefix} or {prefix}_1..{prefix}_{max}", max = crate::credentials::MAX_NUMBERED_CREDENTIALS)]
    NoCredentials { prefix: String },

    /// A configuration value is out of range or malformed
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Request input rejected before any upstream call (maps to HTTP 400).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Keywords are missing or yield an empty prompt
    #[error("No keywords provided")]
    EmptyKeywords,

    /// `num_images` is not an integer in 1..=10
    #[error("Number of images must be between 1 and 10")]
    ImageCountOutOfRange,

    /// The body could not be decoded as JSON or form data
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// `/proxy-image` called without a `url` parameter
    #[error("No image URL provided")]
    MissingImageUrl,
}

/// Errors returned by the upstream image-generation provider.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    /// Network, TLS or timeout failure
    #[error("Upstream request failed: {0}")]
    Request(String),

    /// Provider answered with a non-success status
    #[error("Upstream returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Provider answered 2xx with a body we cannot use
    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),
}

/// Errors that can occur while dispatching a generation request.
#[derive(Debug, Clone, Error)]
pub enum GenerateError {
    /// Every credential was excluded from selection
    #[error("No credential available for selection")]
    EmptyPool,

    /// Keywords produced an empty prompt
    #[error("Prompt (keywords) must not be empty")]
    InvalidPrompt,

    /// Image count outside 1..=10 reached the dispatcher
    #[error("Invalid image count: {0} (must be 1-10)")]
    InvalidCount(u8),

    /// The provider call failed
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Errors raised while fetching a remote image for the proxy endpoint.
#[derive(Debug, Clone, Error)]
pub enum ProxyError {
    /// Network, TLS, timeout or invalid URL
    #[error("{0}")]
    Request(String),

    /// Remote server answered with a non-success status
    #[error("remote server returned {0}")]
    Status(u16),

    /// Failed while reading the response body
    #[error("failed to read body: {0}")]
    Body(String),
}
