//! Wix API client implementation.
//!
//! A plain JSON/REST client built on `reqwest`. Each client is constructed
//! from a [`ClientHandle`] and owns that session's refresh token; access
//! tokens are exchanged lazily and renewed when they near expiry.

use chrono::Utc;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use midnight_runners_core::RefreshToken;

use super::handle::{AccessToken, ClientHandle};
use super::types::{
    AddToCartRequest, Cart, CartResponse, LineItemInput, Product, ProductQuery,
    ProductQueryRequest, ProductQueryResponse, RemoveLineItemsRequest, TokenRequest,
    TokenResponse,
};
use super::{CommerceClient, WixError};

/// Default access token lifetime when the token endpoint omits `expiresIn`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 4 * 60 * 60;

/// Renew access tokens this many seconds before their stated expiry.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// Client for the Wix eCommerce and Stores APIs.
///
/// Holds one session's credentials. Cart calls operate on the session's
/// "current cart", which Wix keys off the access token.
#[derive(Debug)]
pub struct WixApiClient {
    http: reqwest::Client,
    api_base: String,
    client_id: String,
    refresh_token: RefreshToken,
    access: RwLock<AccessToken>,
}

impl WixApiClient {
    /// Build a client from a handle returned by the `/api/client` endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`WixError::Handle`] if the handle carries no usable
    /// credentials.
    pub fn from_handle(api_base: &str, handle: ClientHandle) -> Result<Self, WixError> {
        if handle.client_id.is_empty() {
            return Err(WixError::Handle("Wix client ID is missing".to_string()));
        }
        if handle.tokens.refresh_token.is_empty() {
            return Err(WixError::Handle(
                "refresh token is missing from handle".to_string(),
            ));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            client_id: handle.client_id,
            refresh_token: handle.tokens.refresh_token,
            access: RwLock::new(handle.tokens.access_token),
        })
    }

    /// Get a valid access token, exchanging the refresh token if the cached
    /// one is unissued or near expiry.
    async fn access_token(&self) -> Result<String, WixError> {
        {
            let access = self.access.read().await;
            if is_usable(&access) {
                return Ok(access.value.clone());
            }
        }

        let mut access = self.access.write().await;
        // Another task may have refreshed while we waited for the lock.
        if is_usable(&access) {
            return Ok(access.value.clone());
        }

        let issued = self.exchange_refresh_token().await?;
        *access = issued.clone();
        Ok(issued.value)
    }

    /// Exchange the session refresh token for a fresh access token.
    #[instrument(skip(self))]
    async fn exchange_refresh_token(&self) -> Result<AccessToken, WixError> {
        let request = TokenRequest {
            client_id: self.client_id.clone(),
            grant_type: "refresh_token".to_string(),
            refresh_token: self.refresh_token.value.clone(),
        };

        let response = self
            .http
            .post(format!("{}/oauth2/token", self.api_base))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(WixError::Unauthorized(truncate(&text, 200)));
        }
        if !status.is_success() {
            return Err(WixError::Status {
                status: status.as_u16(),
                message: truncate(&text, 200),
            });
        }

        let token: TokenResponse = serde_json::from_str(&text)?;
        let lifetime = token.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        debug!(lifetime, "access token issued");

        Ok(AccessToken {
            value: token.access_token,
            expires_at: Utc::now().timestamp() + lifetime,
        })
    }

    /// Execute an authorized JSON request against the Wix API.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, WixError> {
        let token = self.access_token().await?;

        let mut builder = self
            .http
            .request(method, format!("{}{path}", self.api_base))
            .bearer_auth(token)
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        let status = response.status();

        // Check for rate limiting before touching the body
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(WixError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let text = response.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(WixError::Unauthorized(truncate(&text, 200)));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate(&text, 500),
                "Wix API returned non-success status"
            );
            return Err(WixError::Status {
                status: status.as_u16(),
                message: truncate(&text, 200),
            });
        }

        match serde_json::from_str(&text) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %truncate(&text, 500),
                    "Failed to parse Wix API response"
                );
                Err(WixError::Parse(e))
            }
        }
    }

    /// Unwrap the `{"cart": ...}` envelope shared by all cart endpoints.
    fn cart_from(response: CartResponse, operation: &str) -> Result<Cart, WixError> {
        response
            .cart
            .ok_or_else(|| WixError::NotFound(format!("no cart in {operation} response")))
    }

    // =========================================================================
    // Product Methods (not cached - always a fresh lookup)
    // =========================================================================

    /// Look up a product by its URL slug.
    ///
    /// # Errors
    ///
    /// Returns an error if no product matches or the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn product_by_slug(&self, slug: &str) -> Result<Product, WixError> {
        let request = ProductQueryRequest {
            query: ProductQuery {
                filter: serde_json::json!({ "slug": { "$eq": slug } }),
            },
        };

        let response: ProductQueryResponse = self
            .request(
                Method::POST,
                "/stores/v1/products/query",
                Some(serde_json::to_value(&request)?),
            )
            .await?;

        response
            .products
            .into_iter()
            .next()
            .ok_or_else(|| WixError::NotFound(format!("Product not found: {slug}")))
    }
}

impl CommerceClient for WixApiClient {
    /// Fetch the session's current cart.
    #[instrument(skip(self))]
    async fn current_cart(&self) -> Result<Cart, WixError> {
        let response: CartResponse = self
            .request(Method::GET, "/ecom/v1/carts/current", None)
            .await?;
        Self::cart_from(response, "current-cart")
    }

    /// Add line items to the current cart.
    #[instrument(skip(self, line_items))]
    async fn add_to_current_cart(
        &self,
        line_items: Vec<LineItemInput>,
    ) -> Result<Cart, WixError> {
        let body = AddToCartRequest { line_items };
        let response: CartResponse = self
            .request(
                Method::POST,
                "/ecom/v1/carts/current/add-to-cart",
                Some(serde_json::to_value(&body)?),
            )
            .await?;
        Self::cart_from(response, "add-to-cart")
    }

    /// Remove the identified line items from the current cart.
    #[instrument(skip(self), fields(count = line_item_ids.len()))]
    async fn remove_line_items(&self, line_item_ids: Vec<String>) -> Result<Cart, WixError> {
        let body = RemoveLineItemsRequest { line_item_ids };
        let response: CartResponse = self
            .request(
                Method::POST,
                "/ecom/v1/carts/current/remove-line-items",
                Some(serde_json::to_value(&body)?),
            )
            .await?;
        Self::cart_from(response, "remove-line-items")
    }
}

/// Whether a cached access token is still safe to use.
fn is_usable(access: &AccessToken) -> bool {
    !access.value.is_empty()
        && access.expires_at > Utc::now().timestamp() + TOKEN_EXPIRY_MARGIN_SECS
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
