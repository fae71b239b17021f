//! Application state shared across handlers.

use std::sync::Arc;

use crate::cart::CartStore;
use crate::config::StorefrontConfig;
use crate::wix::{HttpClientProvider, WixError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources: configuration, the client provider, and the cart
/// store (one per process, created at startup).
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    provider: Arc<HttpClientProvider>,
    cart: CartStore<Arc<HttpClientProvider>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the client provider cannot be constructed from
    /// the configuration.
    pub fn new(config: StorefrontConfig) -> Result<Self, WixError> {
        let provider = Arc::new(HttpClientProvider::new(&config)?);
        let cart = CartStore::new(Arc::clone(&provider), config.wix.app_id.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                provider,
                cart,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the client provider.
    #[must_use]
    pub fn provider(&self) -> &Arc<HttpClientProvider> {
        &self.inner.provider
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore<Arc<HttpClientProvider>> {
        &self.inner.cart
    }
}
