//! Wix platform API client and client provider.
//!
//! # Architecture
//!
//! - Wix is source of truth - NO local sync, direct API calls
//! - Anonymous sessions authenticate via an OAuth refresh token minted by
//!   the `/api/client` endpoint and exchanged for short-lived access tokens
//! - The [`ClientProvider`] seam separates credential/client acquisition
//!   from the cart store, and lets tests substitute a mock backend
//!
//! # Example
//!
//! ```rust,ignore
//! use midnight_runners_storefront::wix::{ClientProvider, HttpClientProvider};
//!
//! let provider = HttpClientProvider::new(&config)?;
//! let client = provider.client().await?;
//!
//! // Look up a product and read the current cart
//! let product = client.product_by_slug("midnight-tee").await?;
//! let cart = client.current_cart().await?;
//! ```

pub mod client;
pub mod handle;
pub mod provider;
pub mod types;

pub use client::WixApiClient;
pub use handle::{AccessToken, ClientHandle, TokenPair};
pub use provider::{ClientProvider, CommerceClient, HttpClientProvider};

use thiserror::Error;

/// Errors that can occur when interacting with the Wix APIs.
#[derive(Debug, Error)]
pub enum WixError {
    /// HTTP request failed (network, DNS, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Access token rejected or expired beyond refresh.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by Wix.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Client handle could not be constructed or used.
    #[error("Invalid client handle: {0}")]
    Handle(String),
}

impl WixError {
    /// Whether this failure means the cached client handle should be
    /// discarded and re-acquired.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}
