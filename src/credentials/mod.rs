//! Credential pool for the upstream image provider.
//!
//! Credentials are discovered once at startup from a numbered naming scheme
//! (`PREFIX_1` .. `PREFIX_19`) plus an optional bare `PREFIX` entry. The pool
//! is immutable afterwards and hands out one credential per dispatch, chosen
//! uniformly at random.
//!
//! # Example
//!
//! ```ignore
//! use image_relay::credentials::CredentialPool;
//!
//! let pool = CredentialPool::from_env("OPENAI_API_KEY")?;
//! let key = pool.select(None)?;
//! ```

mod random;

pub use random::{RandomSource, ThreadRandom};

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{ConfigError, GenerateError};

/// Highest numbered suffix scanned (`PREFIX_1` through `PREFIX_19`).
pub const MAX_NUMBERED_CREDENTIALS: usize = 19;

// =============================================================================
// Credential
// =============================================================================

/// An opaque secret identifying one upstream account.
///
/// `Debug` and `Display` never print the secret.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw secret, for building the upstream `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// A short, non-reversible hint such as `sk-a…` for logs.
    pub fn redacted(&self) -> String {
        let head: String = self.0.chars().take(4).collect();
        format!("{}…(redacted)", head)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.redacted()).finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

// =============================================================================
// Credential Pool
// =============================================================================

/// Deduplicated, non-empty set of credentials for one provider.
pub struct CredentialPool {
    prefix: String,
    credentials: Vec<Credential>,
    random: Arc<dyn RandomSource>,
}

impl CredentialPool {
    /// Discover credentials from process environment variables.
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(prefix, |name| std::env::var(name).ok())
    }

    /// Discover credentials through an arbitrary name lookup.
    ///
    /// Scans `{prefix}_1` ..= `{prefix}_19`, then `{prefix}`. Values are
    /// trimmed; empty values are skipped and duplicates collapse to one.
    pub fn from_lookup<F>(prefix: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let names = (1..=MAX_NUMBERED_CREDENTIALS)
            .map(|i| format!("{}_{}", prefix, i))
            .chain(std::iter::once(prefix.to_string()));

        let credentials = names
            .filter_map(|name| lookup(&name))
            .map(Credential::new)
            .collect::<Vec<_>>();

        Self::from_credentials(prefix, credentials)
    }

    /// Build a pool from an explicit list.
    ///
    /// Values are trimmed, blank ones are skipped and duplicates are dropped,
    /// keeping the first occurrence.
    pub fn from_credentials(
        prefix: &str,
        credentials: impl IntoIterator<Item = Credential>,
    ) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        let credentials: Vec<Credential> = credentials
            .into_iter()
            .map(|c| Credential::new(c.expose().trim()))
            .filter(|c| !c.expose().is_empty())
            .filter(|c| seen.insert(c.clone()))
            .collect();

        if credentials.is_empty() {
            return Err(ConfigError::NoCredentials {
                prefix: prefix.to_string(),
            });
        }

        Ok(Self {
            prefix: prefix.to_string(),
            credentials,
            random: Arc::new(ThreadRandom),
        })
    }

    /// Replace the randomness used by [`select`](Self::select).
    pub fn with_random_source(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Pick one credential uniformly at random, skipping `exclude` if given.
    ///
    /// Selection is stateless: nothing is consumed or rotated.
    pub fn select(&self, exclude: Option<&Credential>) -> Result<&Credential, GenerateError> {
        let candidates: Vec<&Credential> = self
            .credentials
            .iter()
            .filter(|c| Some(*c) != exclude)
            .collect();

        if candidates.is_empty() {
            return Err(GenerateError::EmptyPool);
        }

        // Out-of-range picks from a custom source are clamped, not trusted.
        let index = self.random.pick(candidates.len()).min(candidates.len() - 1);
        Ok(candidates[index])
    }

    /// Environment prefix the pool was discovered under.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn contains(&self, credential: &Credential) -> bool {
        self.credentials.contains(credential)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Credential> {
        self.credentials.iter()
    }
}

impl fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPool")
            .field("prefix", &self.prefix)
            .field("len", &self.credentials.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
