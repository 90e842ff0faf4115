//! Transport seam between the catalog client and the network.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;

/// HTTP methods the catalog client issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Put => f.write_str("PUT"),
        }
    }
}

/// A fully described request, replayable on retry.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            query,
            body: None,
        }
    }

    pub fn put(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Put,
            url: url.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }
}

/// Status, headers and body of a response.
///
/// Header names are stored lowercase.
#[derive(Debug, Clone, Default)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ApiResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can carry an [`ApiRequest`] to the admin API.
///
/// Authentication and content-type headers are the transport's concern;
/// callers only describe the request.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// Production transport backed by a configured `reqwest` client.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Wrap a client that already carries the authentication headers.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Put => self.client.put(&request.url),
        };
        let builder = if request.query.is_empty() {
            builder
        } else {
            builder.query(&request.query)
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = merge_headers(
            response
                .headers()
                .iter()
                .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v))),
        );
        let body = response.text().await?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

/// Collect header pairs under lowercase names, joining repeated headers
/// with `", "` so that several `Link` headers read as one list.
fn merge_headers<'h>(
    pairs: impl IntoIterator<Item = (&'h str, &'h str)>,
) -> HashMap<String, String> {
    let mut headers: HashMap<String, String> = HashMap::new();
    for (name, value) in pairs {
        headers
            .entry(name.to_lowercase())
            .and_modify(|joined| {
                joined.push_str(", ");
                joined.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    headers
}
