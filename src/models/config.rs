//! Application configuration structures.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{CollectionId, validate_tag};

/// Largest page size the admin API accepts.
pub const MAX_PAGE_LIMIT: u32 = 250;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Store location and credentials
    #[serde(default)]
    pub store: StoreConfig,

    /// HTTP client behavior
    #[serde(default)]
    pub client: ClientConfig,

    /// Tag and qualification policy
    #[serde(default)]
    pub sync: SyncConfig,

    /// Console log settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            AppError::config(format!("invalid config file {}: {}", path.display(), e))
        })
    }

    /// Load configuration, falling back to defaults only when the file is missing.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match Self::load(path) {
            Err(AppError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!("Config file {:?} not found. Using defaults.", path);
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Overlay settings from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay settings from an arbitrary variable lookup.
    ///
    /// Empty values count as unset. Recognized variables are `SHOP_URL`,
    /// `SHOPIFY_TOKEN`, `API_VERSION`, `TAG_NAME`, `TAG_POLICY`,
    /// `COLLECTION_ID` and `COLLECTION_TITLE`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(domain) = get("SHOP_URL") {
            self.store.domain = domain;
        }
        if let Some(token) = get("SHOPIFY_TOKEN") {
            self.store.access_token = Some(token);
        }
        if let Some(version) = get("API_VERSION") {
            self.store.api_version = version;
        }
        if let Some(tag) = get("TAG_NAME") {
            self.sync.tag_name = tag;
        }
        if let Some(policy) = get("TAG_POLICY") {
            self.sync.policy = policy.parse()?;
        }
        if let Some(id) = get("COLLECTION_ID") {
            let id = id.trim().parse::<CollectionId>().map_err(|_| {
                AppError::config(format!("COLLECTION_ID is not a numeric id: {id:?}"))
            })?;
            self.sync.collection_id = Some(id);
        }
        if let Some(title) = get("COLLECTION_TITLE") {
            self.sync.collection_title = Some(title);
        }
        Ok(())
    }

    /// Validate everything needed to talk to the store.
    pub fn validate_connection(&self) -> Result<()> {
        if self.store.base_url.is_none() && self.store.normalized_domain().is_empty() {
            return Err(AppError::config(
                "store.domain is empty (set SHOP_URL or [store].domain)",
            ));
        }
        if self.store.token().is_none() {
            return Err(AppError::config(
                "store access token is missing (set SHOPIFY_TOKEN)",
            ));
        }
        if self.store.api_version.trim().is_empty() {
            return Err(AppError::config("store.api_version is empty"));
        }
        url::Url::parse(&self.store.base_url())?;

        if self.client.page_limit == 0 || self.client.page_limit > MAX_PAGE_LIMIT {
            return Err(AppError::config(format!(
                "client.page_limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }
        if self.client.timeout_secs == 0 {
            return Err(AppError::config("client.timeout_secs must be > 0"));
        }
        Ok(())
    }

    /// Validate configuration values before any request is made.
    pub fn validate(&self) -> Result<()> {
        self.validate_connection()?;

        validate_tag(&self.sync.tag_name)?;
        if self.sync.policy == PolicyKind::Collection
            && self.sync.collection_id.is_none()
            && self.sync.collection_title().is_none()
        {
            return Err(AppError::config(
                "collection policy needs sync.collection_id or sync.collection_title",
            ));
        }
        Ok(())
    }
}

/// Store location and credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store domain without scheme (e.g. `your-store.myshopify.com`)
    #[serde(default)]
    pub domain: String,

    /// Admin API version segment
    #[serde(default = "defaults::api_version")]
    pub api_version: String,

    /// Admin API access token; prefer the `SHOPIFY_TOKEN` variable
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,

    /// Full API base URL, replacing the one built from domain and version
    #[serde(default)]
    pub base_url: Option<String>,
}

impl StoreConfig {
    /// Domain with any scheme and trailing slashes removed.
    pub fn normalized_domain(&self) -> &str {
        let domain = self.domain.trim();
        let domain = domain
            .strip_prefix("https://")
            .or_else(|| domain.strip_prefix("http://"))
            .unwrap_or(domain);
        domain.trim_end_matches('/')
    }

    /// Base URL every endpoint path is appended to.
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim().trim_end_matches('/').to_string(),
            None => format!(
                "https://{}/admin/api/{}",
                self.normalized_domain(),
                self.api_version.trim()
            ),
        }
    }

    /// Access token, if one is set and not blank.
    pub fn token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            api_version: defaults::api_version(),
            access_token: None,
            base_url: None,
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("domain", &self.domain)
            .field("api_version", &self.api_version)
            .field("access_token", &self.token().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// HTTP client behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Items requested per page
    #[serde(default = "defaults::page_limit")]
    pub page_limit: u32,

    /// Retries allowed after rate-limit responses, per request
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Wait used when a rate-limit response carries no Retry-After
    #[serde(default = "defaults::retry_after")]
    pub default_retry_after_secs: u64,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Fail instead of stopping when a Link header cannot be parsed
    #[serde(default)]
    pub strict_pagination: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            page_limit: defaults::page_limit(),
            max_retries: defaults::max_retries(),
            default_retry_after_secs: defaults::retry_after(),
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
            strict_pagination: false,
        }
    }
}

/// Which rule decides that a product is discountable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Products outside the reference collection qualify
    #[default]
    Collection,
    /// Products without any compare-at price qualify
    CompareAtPrice,
}

impl PolicyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Collection => "collection",
            PolicyKind::CompareAtPrice => "compare_at_price",
        }
    }
}

impl FromStr for PolicyKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "collection" | "membership" => Ok(PolicyKind::Collection),
            "compare_at_price" | "compare_price" | "price" => Ok(PolicyKind::CompareAtPrice),
            other => Err(AppError::config(format!(
                "unknown policy {other:?} (expected collection or compare_at_price)"
            ))),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag and qualification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Tag kept in sync with eligibility
    #[serde(default = "defaults::tag_name")]
    pub tag_name: String,

    /// Qualification policy
    #[serde(default)]
    pub policy: PolicyKind,

    /// Reference collection id for the collection policy
    #[serde(default)]
    pub collection_id: Option<CollectionId>,

    /// Reference collection title, resolved when no id is given
    #[serde(default)]
    pub collection_title: Option<String>,

    /// Report changes without writing them
    #[serde(default)]
    pub dry_run: bool,
}

impl SyncConfig {
    /// Collection title, if one is set and not blank.
    pub fn collection_title(&self) -> Option<&str> {
        self.collection_title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tag_name: defaults::tag_name(),
            policy: PolicyKind::default(),
            collection_id: None,
            collection_title: None,
            dry_run: false,
        }
    }
}

/// Console log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level shown on the console
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    pub fn api_version() -> String {
        "2025-01".into()
    }
    pub fn page_limit() -> u32 {
        super::MAX_PAGE_LIMIT
    }
    pub fn max_retries() -> u32 {
        5
    }
    pub fn retry_after() -> u64 {
        2
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn user_agent() -> String {
        concat!("tag-sync/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn tag_name() -> String {
        "discountable".into()
    }
    pub fn log_level() -> String {
        "info".into()
    }
}
