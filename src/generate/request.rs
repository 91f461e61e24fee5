//! Inbound request decoding and validation.
//!
//! Validation is independent of the web framework: handlers decode the body
//! into [`GenerateImagesBody`] and call [`validate_request`], which yields a
//! tagged [`Validation`] outcome.

use serde::Deserialize;

use super::prompt::{build_prompt, Keywords};
use crate::error::ValidationError;

/// Image size used when the client does not send one.
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

/// Smallest number of images per request.
pub const MIN_IMAGE_COUNT: u8 = 1;

/// Largest number of images per request.
pub const MAX_IMAGE_COUNT: u8 = 10;

/// `num_images` as sent by clients: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ImageCountInput {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ImageCountInput {
    /// Resolve to an integer. Floats are truncated toward zero; strings may
    /// carry surrounding whitespace.
    pub fn resolve(&self) -> Option<i64> {
        match self {
            ImageCountInput::Integer(n) => Some(*n),
            ImageCountInput::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            ImageCountInput::Float(_) => None,
            ImageCountInput::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Raw body of `POST /v1/generate_images`, shared by JSON and form decoding.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateImagesBody {
    #[serde(default)]
    pub keywords: Option<Keywords>,

    #[serde(default)]
    pub size: Option<String>,

    #[serde(default)]
    pub num_images: Option<ImageCountInput>,
}

impl GenerateImagesBody {
    /// Build a body from form fields in the order they were sent.
    ///
    /// A single `keywords` field becomes [`Keywords::Single`]; repeated ones
    /// are collected into [`Keywords::List`]. For `size` and `num_images` the
    /// first occurrence wins. Unknown fields are ignored.
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut keywords = Vec::new();
        let mut body = Self::default();

        for (name, value) in fields {
            match name.as_ref() {
                "keywords" => keywords.push(value.into()),
                "size" if body.size.is_none() => body.size = Some(value.into()),
                "num_images" if body.num_images.is_none() => {
                    body.num_images = Some(ImageCountInput::Text(value.into()))
                }
                _ => {}
            }
        }

        body.keywords = match keywords.len() {
            0 => None,
            1 => keywords.pop().map(Keywords::Single),
            _ => Some(Keywords::List(keywords)),
        };
        body
    }
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub keywords: Keywords,
    pub size: String,
    pub image_count: u8,
}

impl GenerationRequest {
    pub fn new(keywords: impl Into<Keywords>, size: impl Into<String>, image_count: u8) -> Self {
        Self {
            keywords: keywords.into(),
            size: size.into(),
            image_count,
        }
    }
}

/// Outcome of validating a [`GenerateImagesBody`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid(GenerationRequest),
    EmptyKeywords,
    BadCount,
}

impl Validation {
    pub fn into_result(self) -> Result<GenerationRequest, ValidationError> {
        match self {
            Validation::Valid(request) => Ok(request),
            Validation::EmptyKeywords => Err(ValidationError::EmptyKeywords),
            Validation::BadCount => Err(ValidationError::ImageCountOutOfRange),
        }
    }
}

/// Validate a decoded body. Keywords are checked before the image count.
pub fn validate_request(body: GenerateImagesBody) -> Validation {
    let keywords = match body.keywords {
        Some(k) if build_prompt(&k).is_ok() => k,
        _ => return Validation::EmptyKeywords,
    };

    let count = match body.num_images {
        None => i64::from(MIN_IMAGE_COUNT),
        Some(input) => match input.resolve() {
            Some(n) => n,
            None => return Validation::BadCount,
        },
    };

    if count < i64::from(MIN_IMAGE_COUNT) || count > i64::from(MAX_IMAGE_COUNT) {
        return Validation::BadCount;
    }

    Validation::Valid(GenerationRequest {
        keywords,
        size: body.size.unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string()),
        image_count: count as u8,
    })
}
