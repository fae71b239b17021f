//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Shop
//! GET  /shop/{slug}            - Product detail
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # API
//! GET  /api/client             - Token/Client Provider (mints session credential,
//!                                returns a pre-configured client handle)
//! ```

pub mod cart;
pub mod client;
pub mod home;
pub mod products;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Create the shop routes router.
pub fn shop_routes() -> Router<AppState> {
    Router::new().route("/{slug}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/client", get(client::provide_client))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Product detail pages
        .nest("/shop", shop_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Client provider API
        .nest("/api", api_routes())
}
