//! Prompt assembly from keyword input.

use serde::Deserialize;

use crate::error::GenerateError;

/// Keyword input as sent by clients: either a list of tokens or one string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Keywords {
    List(Vec<String>),
    Single(String),
}

impl Keywords {
    /// True when no token was supplied at all (`[]` or `""`).
    pub fn is_empty(&self) -> bool {
        match self {
            Keywords::List(items) => items.is_empty(),
            Keywords::Single(s) => s.is_empty(),
        }
    }
}

impl From<&str> for Keywords {
    fn from(s: &str) -> Self {
        Keywords::Single(s.to_string())
    }
}

impl From<Vec<String>> for Keywords {
    fn from(items: Vec<String>) -> Self {
        Keywords::List(items)
    }
}

/// Build the prompt sent upstream.
///
/// Lists are joined with single spaces after trimming each token and
/// dropping empty ones; a single string is trimmed.
pub fn build_prompt(keywords: &Keywords) -> Result<String, GenerateError> {
    let prompt = match keywords {
        Keywords::List(items) => items
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Keywords::Single(s) => s.trim().to_string(),
    };

    if prompt.is_empty() {
        return Err(GenerateError::InvalidPrompt);
    }

    Ok(prompt)
}
