//! Credential/client acquisition boundary.
//!
//! The cart store never talks to Wix directly: it asks a [`ClientProvider`]
//! for a ready-to-use client. Production acquisition round-trips through
//! the storefront's own `/api/client` endpoint, which mints or re-reads the
//! session credential; the returned handle is cached so repeated operations
//! do not re-fetch it, with explicit invalidation when the credentials go
//! stale.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, instrument};
use url::Url;

use crate::config::StorefrontConfig;

use super::client::WixApiClient;
use super::handle::ProvideClientResponse;
use super::types::{Cart, LineItemInput};
use super::WixError;

/// The remote commerce calls the cart store performs.
///
/// One method per store operation; implementations issue exactly one remote
/// call per invocation.
pub trait CommerceClient: Send + Sync {
    /// Fetch the session's current cart.
    fn current_cart(&self) -> impl Future<Output = Result<Cart, WixError>> + Send;

    /// Add line items to the current cart, returning the updated cart.
    fn add_to_current_cart(
        &self,
        line_items: Vec<LineItemInput>,
    ) -> impl Future<Output = Result<Cart, WixError>> + Send;

    /// Remove the identified line items, returning the updated cart.
    fn remove_line_items(
        &self,
        line_item_ids: Vec<String>,
    ) -> impl Future<Output = Result<Cart, WixError>> + Send;
}

/// Acquires API clients for the cart store.
pub trait ClientProvider: Send + Sync {
    /// The client type this provider hands out.
    type Client: CommerceClient;

    /// Return a ready-to-use client, acquiring one if none is cached.
    ///
    /// Acquisition failure propagates as a rejected operation; the provider
    /// never retries on its own.
    fn client(&self) -> impl Future<Output = Result<Arc<Self::Client>, WixError>> + Send;

    /// Discard the cached client so the next acquisition starts fresh.
    fn invalidate(&self) -> impl Future<Output = ()> + Send;
}

impl<P: ClientProvider> ClientProvider for Arc<P> {
    type Client = P::Client;

    fn client(&self) -> impl Future<Output = Result<Arc<Self::Client>, WixError>> + Send {
        (**self).client()
    }

    fn invalidate(&self) -> impl Future<Output = ()> + Send {
        (**self).invalidate()
    }
}

/// Production provider: fetches a client handle from `/api/client`.
///
/// The HTTP client keeps a cookie store so the `refreshToken` cookie minted
/// on the first acquisition is replayed on later ones - the same session
/// credential backs every handle this provider builds.
pub struct HttpClientProvider {
    http: reqwest::Client,
    provider_url: Url,
    api_base: String,
    cached: RwLock<Option<Arc<WixApiClient>>>,
}

impl HttpClientProvider {
    /// Create a provider pointing at the storefront's own client endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`WixError::Handle`] if the configured base URL cannot be
    /// turned into an endpoint URL, or [`WixError::Http`] if the HTTP
    /// client cannot be constructed.
    pub fn new(config: &StorefrontConfig) -> Result<Self, WixError> {
        let provider_url = Url::parse(&config.base_url)
            .and_then(|base| base.join("/api/client"))
            .map_err(|e| WixError::Handle(format!("invalid base URL: {e}")))?;

        let http = reqwest::Client::builder().cookie_store(true).build()?;

        Ok(Self {
            http,
            provider_url,
            api_base: config.wix.api_base_url.clone(),
            cached: RwLock::new(None),
        })
    }

    /// Fetch a handle from the client endpoint and build a client from it.
    #[instrument(skip(self))]
    async fn acquire(&self) -> Result<WixApiClient, WixError> {
        let response = self.http.get(self.provider_url.clone()).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %text.chars().take(200).collect::<String>(),
                "client endpoint returned non-success status"
            );
            return Err(WixError::Status {
                status: status.as_u16(),
                message: text.chars().take(200).collect(),
            });
        }

        let envelope: ProvideClientResponse = serde_json::from_str(&text)?;
        WixApiClient::from_handle(&self.api_base, envelope.client)
    }
}

impl ClientProvider for HttpClientProvider {
    type Client = WixApiClient;

    async fn client(&self) -> Result<Arc<WixApiClient>, WixError> {
        if let Some(client) = self.cached.read().await.clone() {
            return Ok(client);
        }

        let mut cached = self.cached.write().await;
        // Another task may have acquired while we waited for the lock.
        if let Some(client) = cached.clone() {
            return Ok(client);
        }

        let client = Arc::new(self.acquire().await?);
        *cached = Some(Arc::clone(&client));
        debug!("client handle acquired and cached");
        Ok(client)
    }

    async fn invalidate(&self) {
        self.cached.write().await.take();
        debug!("cached client handle invalidated");
    }
}
