//! Cursor pagination over `Link` response headers.

use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::LazyLock;

use futures::stream::{self, Stream};
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::client::CatalogClient;
use crate::error::Result;

/// One `<url>; params` entry of a Link header.
static LINK_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^>]*)>([^<]*)").expect("link entry pattern"));

/// A `rel` parameter, quoted or bare.
static REL_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\brel\s*=\s*(?:"([^"]*)"|([^\s;,"]+))"#).expect("rel pattern")
});

/// Where a Link header says to go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextLink {
    /// Continuation URL of the following page
    Next(String),
    /// No `next` relation: this was the last page
    End,
    /// A `next` relation is announced but its URL cannot be read
    Malformed,
}

/// Interpret a Link header value.
pub fn parse_link_header(header: &str) -> NextLink {
    for entry in LINK_ENTRY.captures_iter(header) {
        if !rel_includes_next(&entry[2]) {
            continue;
        }
        let url = entry[1].trim();
        return if url.is_empty() {
            NextLink::Malformed
        } else {
            NextLink::Next(url.to_string())
        };
    }

    if rel_includes_next(header) {
        NextLink::Malformed
    } else {
        NextLink::End
    }
}

fn rel_includes_next(params: &str) -> bool {
    REL_PARAM.captures_iter(params).any(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .is_some_and(|rel| {
                rel.as_str()
                    .split_whitespace()
                    .any(|value| value.eq_ignore_ascii_case("next"))
            })
    })
}

/// Items of one listing page plus the continuation URL, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

/// Lazy walk over every page of a listing.
///
/// Only the first request carries the query parameters; continuation URLs
/// are used exactly as the server returned them.
pub struct Paginator<'a, T> {
    client: &'a CatalogClient,
    next_url: Option<String>,
    query: Vec<(String, String)>,
    root_key: String,
    pages_fetched: usize,
    _item: PhantomData<fn() -> T>,
}

impl<'a, T> Paginator<'a, T> {
    pub(crate) fn new(
        client: &'a CatalogClient,
        url: String,
        query: Vec<(String, String)>,
        root_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            next_url: Some(url),
            query,
            root_key: root_key.into(),
            pages_fetched: 0,
            _item: PhantomData,
        }
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}

impl<'a, T> Paginator<'a, T>
where
    T: DeserializeOwned + Send + 'a,
{
    /// Fetch the next page, or `None` once the listing is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>> {
        let Some(url) = self.next_url.take() else {
            return Ok(None);
        };
        let query = std::mem::take(&mut self.query);

        let page = self
            .client
            .fetch_page::<T>(&url, &query, &self.root_key)
            .await?;
        self.pages_fetched += 1;
        self.next_url = page.next;

        log::debug!(
            "Fetched page {} of {} ({} items, more: {})",
            self.pages_fetched,
            self.root_key,
            page.items.len(),
            self.next_url.is_some()
        );
        Ok(Some(page.items))
    }

    /// Walk every page and return all items.
    pub async fn collect_all(mut self) -> Result<Vec<T>> {
        let mut all = Vec::new();
        while let Some(items) = self.next_page().await? {
            all.extend(items);
        }
        Ok(all)
    }

    /// Flatten the pages into a lazy stream of items.
    ///
    /// A page is only requested once the previous one has been consumed.
    pub fn into_items(self) -> impl Stream<Item = Result<T>> + 'a {
        stream::try_unfold(
            (self, VecDeque::new()),
            |(mut pager, mut buffer)| async move {
                loop {
                    if let Some(item) = buffer.pop_front() {
                        return Ok(Some((item, (pager, buffer))));
                    }
                    match pager.next_page().await? {
                        Some(items) => buffer.extend(items),
                        None => return Ok(None),
                    }
                }
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::TryStreamExt;

    use super::*;
    use crate::client::testing::{ScriptedTransport, json_response};
    use crate::models::ClientConfig;

    #[test]
    fn test_parse_next_link() {
        let header = r#"<https://shop.myshopify.com/admin/api/2025-01/products.json?limit=250&page_info=abc>; rel="next""#;
        assert_eq!(
            parse_link_header(header),
            NextLink::Next(
                "https://shop.myshopify.com/admin/api/2025-01/products.json?limit=250&page_info=abc"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_parse_previous_and_next() {
        let header = r#"<https://s/p.json?page_info=prev>; rel="previous", <https://s/p.json?page_info=next>; rel="next""#;
        assert_eq!(
            parse_link_header(header),
            NextLink::Next("https://s/p.json?page_info=next".to_string())
        );
    }

    #[test]
    fn test_parse_previous_only_is_end() {
        let header = r#"<https://s/p.json?page_info=prev>; rel="previous""#;
        assert_eq!(parse_link_header(header), NextLink::End);
        assert_eq!(parse_link_header(""), NextLink::End);
    }

    #[test]
    fn test_parse_bare_rel_value() {
        let header = "<https://s/p.json?page_info=2>; rel=next";
        assert_eq!(
            parse_link_header(header),
            NextLink::Next("https://s/p.json?page_info=2".to_string())
        );
    }

    #[test]
    fn test_parse_malformed_next() {
        assert_eq!(
            parse_link_header(r#"https://s/p.json?page_info=2; rel="next""#),
            NextLink::Malformed
        );
        assert_eq!(parse_link_header(r#"<>; rel="next""#), NextLink::Malformed);
    }

    fn page_body(ids: &[u64]) -> String {
        let items: Vec<_> = ids.iter().map(|id| serde_json::json!({ "id": id })).collect();
        serde_json::json!({ "products": items }).to_string()
    }

    fn client_for(transport: Arc<ScriptedTransport>) -> CatalogClient {
        CatalogClient::new("https://shop/admin/api/2025-01", transport, &ClientConfig::default())
    }

    #[derive(serde::Deserialize)]
    struct Item {
        id: u64,
    }

    #[tokio::test]
    async fn test_visits_every_item_once_across_pages() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(json_response(200, &page_body(&[1, 2])).with_link("https://shop/p?page_info=2"));
        transport.push(json_response(200, &page_body(&[3])).with_link("https://shop/p?page_info=3"));
        transport.push(json_response(200, &page_body(&[4, 5])));

        let client = client_for(Arc::clone(&transport));
        let query = vec![("fields".to_string(), "id".to_string())];
        let items: Vec<Item> = client
            .paginate::<Item>("products.json", query, "products")
            .into_items()
            .try_collect()
            .await
            .unwrap();

        let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].url, "https://shop/admin/api/2025-01/products.json");
        assert!(requests[0].query.contains(&("limit".to_string(), "250".to_string())));
        assert!(requests[0].query.contains(&("fields".to_string(), "id".to_string())));
        assert_eq!(requests[1].url, "https://shop/p?page_info=2");
        assert!(requests[1].query.is_empty());
        assert!(requests[2].query.is_empty());
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(json_response(200, r#"{"products": []}"#));

        let client = client_for(Arc::clone(&transport));
        let mut pager = client.paginate::<Item>("products.json", Vec::new(), "products");
        assert_eq!(pager.next_page().await.unwrap().map(|p| p.len()), Some(0));
        assert!(pager.next_page().await.unwrap().is_none());
        assert_eq!(pager.pages_fetched(), 1);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_root_key_is_empty_page() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(json_response(200, "{}"));

        let client = client_for(transport);
        let items = client
            .paginate::<Item>("products.json", Vec::new(), "products")
            .collect_all()
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_stream_is_lazy() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(json_response(200, &page_body(&[1])).with_link("https://shop/p?page_info=2"));
        transport.push(json_response(200, &page_body(&[2])));

        let client = client_for(Arc::clone(&transport));
        let stream = client
            .paginate::<Item>("products.json", Vec::new(), "products")
            .into_items();
        futures::pin_mut!(stream);

        let first = stream.try_next().await.unwrap().unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(transport.requests().len(), 1);

        let second = stream.try_next().await.unwrap().unwrap();
        assert_eq!(second.id, 2);
        assert_eq!(transport.requests().len(), 2);
        assert!(stream.try_next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_link_stops_by_default() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(
            json_response(200, &page_body(&[1]))
                .with_header("link", r#"https://shop/p?page_info=2; rel="next""#),
        );

        let client = client_for(Arc::clone(&transport));
        let items = client
            .paginate::<Item>("products.json", Vec::new(), "products")
            .collect_all()
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_link_fails_when_strict() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(
            json_response(200, &page_body(&[1]))
                .with_header("link", r#"<>; rel="next""#),
        );

        let config = ClientConfig {
            strict_pagination: true,
            ..ClientConfig::default()
        };
        let client = CatalogClient::new("https://shop/admin/api/2025-01", transport, &config);
        let result = client
            .paginate::<Item>("products.json", Vec::new(), "products")
            .collect_all()
            .await;
        assert!(matches!(result, Err(crate::error::AppError::Pagination(_))));
    }
}
