// src/error.rs

//! Unified error handling for the tag synchronizer.

use std::fmt;

use thiserror::Error;

/// Result type alias for tag-sync operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Longest response body excerpt kept in a request error.
const BODY_EXCERPT_LIMIT: usize = 512;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("{method} {url} failed with status {status}: {body}")]
    Request {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Link header could not be interpreted
    #[error("Pagination error: {0}")]
    Pagination(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a pagination error.
    pub fn pagination(message: impl fmt::Display) -> Self {
        Self::Pagination(message.to_string())
    }

    /// Create a request error, keeping only the head of the response body.
    pub fn request(
        method: impl fmt::Display,
        url: impl Into<String>,
        status: u16,
        body: &str,
    ) -> Self {
        let body = match body.char_indices().nth(BODY_EXCERPT_LIMIT) {
            Some((cut, _)) => format!("{}…", &body[..cut]),
            None => body.to_string(),
        };
        Self::Request {
            method: method.to_string(),
            url: url.into(),
            status,
            body,
        }
    }

    /// HTTP status carried by a request error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether this error is a rate-limit response that outlived its retries.
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }
}
