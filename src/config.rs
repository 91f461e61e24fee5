//! Configuration management for Image Relay.
//!
//! This module provides a configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `RELAY_` prefix (and a `.env` file, loaded by
//!   the binary before parsing)
//! - Sensible defaults for all optional settings
//!
//! Upstream credentials are not part of [`Config`]; they are discovered by
//! [`CredentialPool::from_env`](crate::credentials::CredentialPool::from_env)
//! under the configured prefix (`OPENAI_API_KEY` by default).
//!
//! # Environment Variables
//!
//! - `RELAY_HOST` - Server bind address (default: 0.0.0.0)
//! - `RELAY_PORT` - Server port (default: 5000)
//! - `RELAY_OPENAI_BASE_URL` - API root (default: https://api.openai.com/v1)
//! - `RELAY_MODEL` - Image model (default: dall-e-3)
//! - `RELAY_CREDENTIAL_PREFIX` - Credential variable prefix (default: OPENAI_API_KEY)
//! - `RELAY_UPSTREAM_TIMEOUT` - Generation call timeout in seconds (default: 120)
//! - `RELAY_PROXY_TIMEOUT` - Image proxy timeout in seconds (default: 30)
//! - `RELAY_CORS_ORIGINS` - Allowed CORS origins, comma-separated (default: any)

use clap::Parser;

use crate::error::ConfigError;
use crate::proxy::DEFAULT_PROXY_TIMEOUT_SECS;
use crate::upstream::{DEFAULT_MODEL, DEFAULT_OPENAI_BASE_URL, DEFAULT_UPSTREAM_TIMEOUT_SECS};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default environment prefix for upstream credentials.
pub const DEFAULT_CREDENTIAL_PREFIX: &str = "OPENAI_API_KEY";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Image Relay - generate images through the OpenAI Images API.
///
/// Spreads requests across every configured API key and proxies generated
/// images back to the browser.
#[derive(Parser, Debug, Clone)]
#[command(name = "image-relay")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "RELAY_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "RELAY_PORT")]
    pub port: u16,

    // =========================================================================
    // Upstream Configuration
    // =========================================================================
    /// Root URL of the OpenAI-compatible API.
    #[arg(long, default_value = DEFAULT_OPENAI_BASE_URL, env = "RELAY_OPENAI_BASE_URL")]
    pub openai_base_url: String,

    /// Image model to request.
    #[arg(long, default_value = DEFAULT_MODEL, env = "RELAY_MODEL")]
    pub model: String,

    /// Environment prefix scanned for API keys (`PREFIX`, `PREFIX_1`..`PREFIX_19`).
    #[arg(long, default_value = DEFAULT_CREDENTIAL_PREFIX, env = "RELAY_CREDENTIAL_PREFIX")]
    pub credential_prefix: String,

    /// Timeout for each image generation call, in seconds.
    #[arg(long, default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SECS, env = "RELAY_UPSTREAM_TIMEOUT")]
    pub upstream_timeout: u64,

    /// Timeout for proxied image fetches, in seconds.
    #[arg(long, default_value_t = DEFAULT_PROXY_TIMEOUT_SECS, env = "RELAY_PROXY_TIMEOUT")]
    pub proxy_timeout: u64,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "RELAY_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.credential_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "credential prefix must not be empty. Set --credential-prefix or RELAY_CREDENTIAL_PREFIX"
                    .to_string(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".to_string()));
        }

        match url::Url::parse(&self.openai_base_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => {
                return Err(ConfigError::Invalid(format!(
                    "openai_base_url must use http or https, got '{}'",
                    parsed.scheme()
                )))
            }
            Err(e) => {
                return Err(ConfigError::Invalid(format!(
                    "openai_base_url is not a valid URL: {}",
                    e
                )))
            }
        }

        if self.upstream_timeout == 0 {
            return Err(ConfigError::Invalid(
                "upstream_timeout must be greater than 0".to_string(),
            ));
        }
        if self.proxy_timeout == 0 {
            return Err(ConfigError::Invalid(
                "proxy_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Tests
// =============================================================================
