//! In-memory transports and sleepers for tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use url::Url;

use super::{ApiRequest, ApiResponse, HttpTransport, Method, Sleeper};
use crate::error::Result;
use crate::models::{Collection, CollectionId, Product, ProductId};

pub const TEST_BASE_URL: &str = "https://test-shop.myshopify.com/admin/api/2025-01";

impl ApiResponse {
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_lowercase(), value.to_string());
        self
    }

    pub fn with_link(self, next_url: &str) -> Self {
        self.with_header("link", &format!("<{next_url}>; rel=\"next\""))
    }
}

pub fn json_response(status: u16, body: &str) -> ApiResponse {
    ApiResponse {
        status,
        headers: HashMap::new(),
        body: body.to_string(),
    }
}

/// Replays queued responses in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<ApiResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: ApiResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| json_response(500, "no scripted response left")))
    }
}

/// Records requested waits instead of sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

#[derive(Default)]
struct StoreState {
    products: Vec<Product>,
    smart: Vec<Collection>,
    custom: Vec<Collection>,
    members: HashMap<CollectionId, Vec<ProductId>>,
}

/// A tiny admin API: paginated listings, collection filters, field
/// projection and tag updates, all in memory.
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<StoreState>,
    injected: Mutex<VecDeque<ApiResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_product(&self, product: Product) {
        self.state.lock().unwrap().products.push(product);
    }

    pub fn add_smart_collection(&self, id: CollectionId, title: &str) {
        self.state.lock().unwrap().smart.push(Collection {
            id,
            title: title.to_string(),
        });
    }

    pub fn add_custom_collection(&self, id: CollectionId, title: &str) {
        self.state.lock().unwrap().custom.push(Collection {
            id,
            title: title.to_string(),
        });
    }

    pub fn add_member(&self, collection: CollectionId, product: ProductId) {
        self.state
            .lock()
            .unwrap()
            .members
            .entry(collection)
            .or_default()
            .push(product);
    }

    /// Serve `response` before handling the next request normally.
    pub fn inject(&self, response: ApiResponse) {
        self.injected.lock().unwrap().push_back(response);
    }

    pub fn tags_of(&self, id: ProductId) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.tags.clone())
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == Method::Put)
            .collect()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let Ok(url) = Url::parse(&request.url) else {
            return json_response(400, "bad url");
        };
        let mut params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        params.extend(request.query.iter().cloned());

        let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();
        let last = segments.last().copied().unwrap_or_default();
        let parent = segments.len().checked_sub(2).map(|i| segments[i]);

        let state = self.state.lock().unwrap();
        match (request.method, last, parent) {
            (Method::Get, "products.json", _) => {
                let filter: Option<CollectionId> =
                    params.get("collection_id").and_then(|id| id.parse().ok());
                let products: Vec<&Product> = match filter {
                    Some(collection) => {
                        let members = state.members.get(&collection).cloned().unwrap_or_default();
                        state
                            .products
                            .iter()
                            .filter(|p| members.contains(&p.id))
                            .collect()
                    }
                    None => state.products.iter().collect(),
                };
                listing(&url, "products", &products, &params)
            }
            (Method::Get, "smart_collections.json", _) => {
                listing(&url, "smart_collections", &state.smart, &params)
            }
            (Method::Get, "custom_collections.json", _) => {
                listing(&url, "custom_collections", &state.custom, &params)
            }
            (Method::Put, file, Some("products")) => {
                drop(state);
                self.update_product(file, request.body.as_ref())
            }
            _ => json_response(404, r#"{"errors": "Not Found"}"#),
        }
    }

    fn update_product(&self, file: &str, body: Option<&Value>) -> ApiResponse {
        let Some(id) = file
            .strip_suffix(".json")
            .and_then(|id| id.parse::<ProductId>().ok())
        else {
            return json_response(404, r#"{"errors": "Not Found"}"#);
        };
        let Some(tags) = body
            .and_then(|b| b.pointer("/product/tags"))
            .and_then(Value::as_str)
        else {
            return json_response(422, r#"{"errors": {"tags": ["missing"]}}"#);
        };

        let mut state = self.state.lock().unwrap();
        match state.products.iter_mut().find(|p| p.id == id) {
            Some(product) => {
                product.tags = tags.to_string();
                json_response(200, &json!({ "product": product }).to_string())
            }
            None => json_response(404, r#"{"errors": "Not Found"}"#),
        }
    }
}

/// One page of `items`, honoring `limit`, `page_info` (an offset here) and
/// `fields`.
fn listing<T: Serialize>(
    url: &Url,
    root: &str,
    items: &[T],
    params: &HashMap<String, String>,
) -> ApiResponse {
    let limit: usize = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(50)
        .max(1);
    let offset: usize = params
        .get("page_info")
        .and_then(|o| o.parse().ok())
        .unwrap_or(0);
    let fields: Option<HashSet<&str>> = params.get("fields").map(|f| f.split(',').collect());

    let page: Vec<Value> = items
        .iter()
        .skip(offset)
        .take(limit)
        .map(|item| {
            let mut value = serde_json::to_value(item).unwrap();
            if let (Some(fields), Some(object)) = (&fields, value.as_object_mut()) {
                object.retain(|key, _| fields.contains(key.as_str()));
            }
            value
        })
        .collect();

    let mut body = serde_json::Map::new();
    body.insert(root.to_string(), Value::Array(page));
    let response = json_response(200, &Value::Object(body).to_string());
    if offset + limit >= items.len() {
        return response;
    }

    let mut next = url.clone();
    next.set_query(None);
    {
        let mut pairs = next.query_pairs_mut();
        pairs.append_pair("limit", &limit.to_string());
        pairs.append_pair("page_info", &(offset + limit).to_string());
        for key in ["fields", "collection_id"] {
            if let Some(value) = params.get(key) {
                pairs.append_pair(key, value);
            }
        }
    }
    response.with_link(next.as_str())
}

#[async_trait]
impl HttpTransport for FakeStore {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(response) = self.injected.lock().unwrap().pop_front() {
            return Ok(response);
        }
        Ok(self.handle(request))
    }
}
