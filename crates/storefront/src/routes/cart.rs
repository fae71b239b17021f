//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! All handlers go through the process-wide cart store; failures leave the
//! store's snapshot per its error policy and render a stale (or error)
//! fragment rather than surfacing a typed error to the page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::instrument;

use midnight_runners_core::{LineItemId, ProductId, VariantId};

use crate::cart::CartSnapshot;
use crate::filters;
use crate::state::AppState;
use crate::wix::types::{Cart as WixCart, LineItem};

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub quantity: u32,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub counter: u32,
    pub is_loading: bool,
}

impl CartView {
    /// Create an empty cart view.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            counter: 0,
            is_loading: false,
        }
    }
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&LineItem> for CartItemView {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id.clone().unwrap_or_default(),
            name: item
                .product_name
                .as_ref()
                .and_then(|n| n.original.clone())
                .unwrap_or_else(|| "Item".to_string()),
            quantity: item.quantity.unwrap_or(1),
        }
    }
}

impl From<&WixCart> for CartView {
    fn from(cart: &WixCart) -> Self {
        Self {
            items: cart.line_items.iter().map(CartItemView::from).collect(),
            counter: cart.line_item_count(),
            is_loading: false,
        }
    }
}

impl From<&CartSnapshot> for CartView {
    fn from(snapshot: &CartSnapshot) -> Self {
        let mut view = snapshot
            .cart
            .as_ref()
            .map_or_else(Self::empty, Self::from);
        view.counter = snapshot.counter;
        view.is_loading = snapshot.is_loading;
        view
    }
}

// =============================================================================
// Forms & Templates
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub variant_id: Option<String>,
    pub quantity: Option<u32>,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_item_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page after refreshing the store from the remote cart.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = match state.cart().get_cart().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            // Stale-state policy: render whatever the store still holds.
            tracing::warn!("Failed to refresh cart: {e}");
            state.cart().snapshot().await
        }
    };

    CartShowTemplate {
        cart: CartView::from(&snapshot),
    }
}

/// Add item to cart (HTMX).
///
/// Returns the cart count badge with an HTMX trigger to update other
/// elements listening for `cart-updated`.
#[instrument(skip(state))]
pub async fn add(State(state): State<AppState>, Form(form): Form<AddToCartForm>) -> Response {
    let result = state
        .cart()
        .add_item(
            ProductId::new(form.product_id),
            VariantId::new(form.variant_id.unwrap_or_default()),
            form.quantity.unwrap_or(1),
        )
        .await;

    match result {
        Ok(snapshot) => (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartCountTemplate {
                count: snapshot.counter,
            },
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to add item to cart: {e}");
            (
                StatusCode::BAD_GATEWAY,
                Html("<span class=\"text-red-500\">Error adding to cart</span>"),
            )
                .into_response()
        }
    }
}

/// Remove item from cart (HTMX).
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    match state
        .cart()
        .remove_item(LineItemId::new(form.line_item_id))
        .await
    {
        Ok(snapshot) => (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate {
                cart: CartView::from(&snapshot),
            },
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to remove from cart: {e}");
            let snapshot = state.cart().snapshot().await;
            CartItemsTemplate {
                cart: CartView::from(&snapshot),
            }
            .into_response()
        }
    }
}

/// Get cart count badge (HTMX). Reads the snapshot; no remote call.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.cart().snapshot().await;
    CartCountTemplate {
        count: snapshot.counter,
    }
}
