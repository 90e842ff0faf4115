// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::error::{AppError, Result};
use crate::models::ClientConfig;

/// Header carrying the admin API access token.
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Headers attached to every admin API request.
pub fn default_headers(token: &str) -> Result<HeaderMap> {
    let mut token = HeaderValue::from_str(token.trim())
        .map_err(|_| AppError::config("access token contains characters not allowed in a header"))?;
    token.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(ACCESS_TOKEN_HEADER, token);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

/// Create a configured asynchronous HTTP client for the admin API.
pub fn create_async_client(config: &ClientConfig, token: &str) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .default_headers(default_headers(token)?)
        .build()?;
    Ok(client)
}
