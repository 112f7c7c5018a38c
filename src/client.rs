//! Shopify API client.
//!
//! Low-level HTTP client that handles authentication and raw requests.
//! Retry, decoding and pagination live in [`RequestExecutor`]; resource
//! operations are implemented via traits on entity types.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::{Result, ShopifyError};
use crate::executor::{RawResponse, RequestExecutor};
use crate::request::RequestDescriptor;
use crate::retry::{CancellationToken, RetryPolicy};

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2024-01";

/// Header carrying the shop's access token.
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

const USER_AGENT: &str = concat!("shopapi/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Low-level Shopify Admin API client.
///
/// Handles base URL construction, authentication and HTTP transport.
/// Entity-specific operations are implemented via the `Get`, `List`,
/// `Create`, `Update`, `Delete` and `Count` traits on model types.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use shopapi::ShopifyClient;
///
/// # async fn example() -> shopapi::Result<()> {
/// // Create from environment variables
/// let client = ShopifyClient::from_env()?;
///
/// // Or configure manually
/// let client = ShopifyClient::new("acme", "shpat_xxx")?.with_api_version("2024-04")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ShopifyClient {
    http: Client,
    shop_url: Arc<Url>,
    base_url: Arc<Url>,
    api_version: String,
    token: String,
    retry: RetryPolicy,
    cancellation: Option<CancellationToken>,
}

impl std::fmt::Debug for ShopifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl ShopifyClient {
    /// Create a client from environment variables.
    ///
    /// Uses `SHOPIFY_SHOP` and `SHOPIFY_ACCESS_TOKEN`, and optionally
    /// `SHOPIFY_API_VERSION` (defaults to [`DEFAULT_API_VERSION`]).
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is not set or the shop is not
    /// a valid host.
    pub fn from_env() -> Result<Self> {
        let shop = env::var("SHOPIFY_SHOP").map_err(|_| {
            ShopifyError::ConfigMissing("SHOPIFY_SHOP environment variable not set".to_string())
        })?;
        let token = env::var("SHOPIFY_ACCESS_TOKEN").map_err(|_| {
            ShopifyError::ConfigMissing(
                "SHOPIFY_ACCESS_TOKEN environment variable not set".to_string(),
            )
        })?;

        let client = Self::new(&shop, &token)?;
        match env::var("SHOPIFY_API_VERSION") {
            Ok(version) => client.with_api_version(&version),
            Err(_) => Ok(client),
        }
    }

    /// Create a new client for `shop` authenticated with `token`.
    ///
    /// `shop` may be a bare shop name (`acme`), a myshopify domain
    /// (`acme.myshopify.com`) or a full origin (`https://acme.myshopify.com`,
    /// `http://127.0.0.1:8080`).
    ///
    /// # Errors
    ///
    /// Returns an error if the shop URL is invalid or the token is empty.
    pub fn new(shop: &str, token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(ShopifyError::ConfigMissing(
                "access token must not be empty".to_string(),
            ));
        }

        let shop_url = shop_url(shop)?;
        let base_url = api_url(&shop_url, DEFAULT_API_VERSION)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(ShopifyError::TransportError)?;

        Ok(Self {
            http,
            shop_url: Arc::new(shop_url),
            base_url: Arc::new(base_url),
            api_version: DEFAULT_API_VERSION.to_string(),
            token: token.to_string(),
            retry: RetryPolicy::default(),
            cancellation: None,
        })
    }

    /// Target a different API version, e.g. `2024-04` or `unstable`.
    ///
    /// # Errors
    ///
    /// Returns an error if the version is empty or contains a `/`.
    pub fn with_api_version(mut self, version: &str) -> Result<Self> {
        if version.is_empty() || version.contains('/') {
            return Err(ShopifyError::InvalidArgument(format!(
                "invalid API version '{version}'"
            )));
        }
        self.base_url = Arc::new(api_url(&self.shop_url, version)?);
        self.api_version = version.to_string();
        Ok(self)
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Replace the per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be rebuilt.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(timeout)
            .build()
            .map_err(ShopifyError::TransportError)?;
        Ok(self)
    }

    /// A clone of this client whose calls abort when `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            cancellation: Some(token),
            ..self.clone()
        }
    }

    /// Get the versioned API root, e.g.
    /// `https://acme.myshopify.com/admin/api/2024-01/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the configured API version.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }
}

#[async_trait]
impl RequestExecutor for ShopifyClient {
    #[tracing::instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse> {
        let url = self.base_url.join(request.path())?;

        let mut builder = self
            .http
            .request(request.method().into(), url)
            .header(ACCESS_TOKEN_HEADER, &self.token);

        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(ShopifyError::TransportError)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(ShopifyError::TransportError)?;

        tracing::debug!(status, bytes = body.len(), "received response");

        Ok(RawResponse::new(status, headers, body))
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }
}

/// Normalize the caller's shop identifier into an origin URL.
fn shop_url(shop: &str) -> Result<Url> {
    let shop = shop.trim().trim_end_matches('/');
    if shop.is_empty() {
        return Err(ShopifyError::ConfigMissing("shop must not be empty".to_string()));
    }

    let origin = if shop.contains("://") {
        shop.to_string()
    } else if shop.contains('.') {
        format!("https://{shop}")
    } else {
        format!("https://{shop}.myshopify.com")
    };

    let url = Url::parse(&origin)?;
    if url.host_str().is_none() {
        return Err(ShopifyError::InvalidArgument(format!(
            "shop '{shop}' has no host"
        )));
    }
    Ok(url)
}

fn api_url(shop_url: &Url, version: &str) -> Result<Url> {
    Ok(shop_url.join(&format!("/admin/api/{version}/"))?)
}
