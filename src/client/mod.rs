//! Rate-limited, paginated client for the store admin API.
//!
//! - `transport`: the network seam (`HttpTransport`) and its reqwest implementation
//! - `retry`: bounded waiting on rate-limit responses
//! - `pagination`: Link header cursors and the lazy `Paginator`

mod pagination;
mod retry;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::models::{ClientConfig, Config, ProductId, Tags};
use crate::utils::http;

pub use pagination::{NextLink, Page, Paginator, parse_link_header};
pub use retry::{MAX_RETRY_WAIT, RATE_LIMIT_STATUS, RetryPolicy, Sleeper, TokioSleeper};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, ReqwestTransport};

/// Client for the catalog endpoints of one store.
pub struct CatalogClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    sleeper: Arc<dyn Sleeper>,
    retry: RetryPolicy,
    page_limit: u32,
    strict_pagination: bool,
}

impl CatalogClient {
    /// Create a client over an arbitrary transport.
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            sleeper: Arc::new(TokioSleeper),
            retry: RetryPolicy::from(config),
            page_limit: config.page_limit,
            strict_pagination: config.strict_pagination,
        }
    }

    /// Create a client talking to the configured store over HTTPS.
    pub fn from_config(config: &Config) -> Result<Self> {
        let token = config
            .store
            .token()
            .ok_or_else(|| AppError::config("store access token is missing"))?;
        let client = http::create_async_client(&config.client, token)?;
        Ok(Self::new(
            config.store.base_url(),
            Arc::new(ReqwestTransport::new(client)),
            &config.client,
        ))
    }

    /// Replace the sleeper used while waiting out rate limits.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn page_limit(&self) -> u32 {
        self.page_limit
    }

    /// Absolute URL of an endpoint path such as `products.json`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request, waiting out rate limits within the retry budget.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut retries = 0;
        loop {
            let response = self.transport.send(&request).await?;

            if response.status == RATE_LIMIT_STATUS {
                if !self.retry.allows_retry(retries) {
                    log::error!(
                        "{} {} still rate limited after {} retries",
                        request.method,
                        request.url,
                        retries
                    );
                    return Err(AppError::request(
                        request.method,
                        &request.url,
                        response.status,
                        &response.body,
                    ));
                }

                let wait = self.retry.wait_for(response.header("retry-after"));
                retries += 1;
                log::warn!(
                    "Rate limited on {} {}; retry {}/{} in {:.1}s",
                    request.method,
                    request.url,
                    retries,
                    self.retry.max_retries,
                    wait.as_secs_f64()
                );
                self.sleeper.sleep(wait).await;
                continue;
            }

            if !response.is_success() {
                return Err(AppError::request(
                    request.method,
                    &request.url,
                    response.status,
                    &response.body,
                ));
            }
            return Ok(response);
        }
    }

    /// Fetch one listing page and its continuation URL.
    ///
    /// `root_key` names the JSON field holding the items; a missing or null
    /// field yields an empty page.
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
        root_key: &str,
    ) -> Result<Page<T>> {
        let response = self
            .execute(ApiRequest::get(url, query.to_vec()))
            .await?;

        let mut body: Value = serde_json::from_str(&response.body)?;
        let items = match body.get_mut(root_key).map(Value::take) {
            None | Some(Value::Null) => Vec::new(),
            Some(items) => serde_json::from_value(items)?,
        };

        let next = match response.header("link").map(parse_link_header) {
            None | Some(NextLink::End) => None,
            Some(NextLink::Next(url)) => Some(url),
            Some(NextLink::Malformed) => {
                let header = response.header("link").unwrap_or_default();
                if self.strict_pagination {
                    return Err(AppError::pagination(format!(
                        "unreadable next link in Link header from {url}: {header}"
                    )));
                }
                log::warn!(
                    "Unreadable next link from {}; stopping pagination early: {}",
                    url,
                    header
                );
                None
            }
        };

        Ok(Page { items, next })
    }

    /// Send a JSON body with PUT.
    pub async fn put_json(&self, url: &str, body: Value) -> Result<()> {
        self.execute(ApiRequest::put(url, body)).await?;
        Ok(())
    }

    /// Start a lazy walk over a listing endpoint.
    ///
    /// The configured page size is added to `query` for the first request.
    pub fn paginate<T>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
        root_key: &str,
    ) -> Paginator<'_, T>
    where
        T: DeserializeOwned,
    {
        let mut params = vec![("limit".to_string(), self.page_limit.to_string())];
        params.extend(query);
        Paginator::new(self, self.endpoint(path), params, root_key)
    }

    /// Overwrite a product's tag field with the given list.
    pub async fn update_product_tags(&self, id: ProductId, tags: &Tags) -> Result<()> {
        let url = self.endpoint(&format!("products/{id}.json"));
        let body = json!({ "product": { "id": id, "tags": tags.to_field() } });
        self.put_json(&url, body).await
    }
}
