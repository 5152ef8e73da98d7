//! Error handling and custom error types
//!
//! Provides unified error handling across the proxy using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Image fetch error: {0}")]
    ImageFetch(String),

    /// Non-2xx reply from the generation API. `details` is the decoded error
    /// body, or the raw text when the body was not JSON.
    #[error("Upstream error (status {status}): {}", upstream_message(.details))]
    Upstream {
        status: u16,
        details: serde_json::Value,
    },
}

impl Error {
    /// Status carried by the error itself, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Structured details for the client-facing error envelope.
    pub fn details(&self) -> serde_json::Value {
        match self {
            Error::Upstream { details, .. } => details.clone(),
            other => serde_json::Value::String(other.to_string()),
        }
    }
}

/// Best human-readable message out of a Gemini error body.
pub fn upstream_message(details: &serde_json::Value) -> String {
    details
        .pointer("/error/message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .or_else(|| details.as_str().map(str::to_string))
        .unwrap_or_else(|| details.to_string())
}

pub type Result<T> = std::result::Result<T, Error>;
