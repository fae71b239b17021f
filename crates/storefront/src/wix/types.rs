//! Domain types for the Wix eCommerce and Stores APIs.
//!
//! Wire shapes are camelCase JSON. Response fields the storefront does not
//! rely on are defaulted so catalog-side schema growth never breaks parsing.

use serde::{Deserialize, Serialize};

// =============================================================================
// Cart Types
// =============================================================================

/// A server-held cart for the current session.
///
/// The storefront relies only on the cart's identity and its line items;
/// everything else is owned by Wix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Cart ID (absent until Wix materializes the cart).
    #[serde(default)]
    pub id: Option<String>,
    /// Ordered line items.
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl Cart {
    /// Number of line items, the value cached in the store counter.
    #[must_use]
    pub fn line_item_count(&self) -> u32 {
        u32::try_from(self.line_items.len()).unwrap_or(u32::MAX)
    }
}

/// One entry in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Line item ID (used for removal).
    #[serde(default)]
    pub id: Option<String>,
    /// Quantity of the referenced catalog item.
    #[serde(default)]
    pub quantity: Option<u32>,
    /// Reference to the purchasable catalog item.
    #[serde(default)]
    pub catalog_reference: Option<CatalogReference>,
    /// Display name as resolved by Wix.
    #[serde(default)]
    pub product_name: Option<ProductName>,
}

/// Display name for a line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductName {
    /// Name in the site's original language.
    #[serde(default)]
    pub original: Option<String>,
}

/// Identifier tuple for a purchasable catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogReference {
    /// App/catalog ID (process-wide configuration, not caller-supplied).
    pub app_id: String,
    /// Catalog item (product) ID.
    pub catalog_item_id: String,
    /// Item options, present only when a variant is selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<CatalogItemOptions>,
}

/// Options attached to a catalog reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItemOptions {
    /// Selected variant ID.
    pub variant_id: String,
}

/// A line item as submitted to `add-to-cart`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    /// Catalog reference for the item being added.
    pub catalog_reference: CatalogReference,
    /// Quantity to add.
    pub quantity: u32,
}

/// Request body for `add-to-cart`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub line_items: Vec<LineItemInput>,
}

/// Request body for `remove-line-items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveLineItemsRequest {
    pub line_item_ids: Vec<String>,
}

/// Response envelope carrying a cart.
///
/// All cart endpoints (fetch, add, remove) respond with `{"cart": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    #[serde(default)]
    pub cart: Option<Cart>,
}

// =============================================================================
// OAuth Types
// =============================================================================

/// Request body for the OAuth token endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub client_id: String,
    pub grant_type: String,
    pub refresh_token: String,
}

/// Response from the OAuth token endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

// =============================================================================
// Product Types
// =============================================================================

/// A catalog product, as returned by the Stores query API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    /// HTML description.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<PriceData>,
    #[serde(default)]
    pub media: Option<Media>,
    #[serde(default)]
    pub stock: Option<Stock>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub additional_info_sections: Vec<InfoSection>,
}

/// Price data for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceData {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub discounted_price: Option<f64>,
}

/// Product media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    #[serde(default)]
    pub main_media: Option<MediaItem>,
}

/// A single media item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    #[serde(default)]
    pub image: Option<Image>,
}

/// An image with its URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub url: String,
}

/// Stock information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    #[serde(default)]
    pub in_stock: Option<bool>,
    /// Absent when inventory tracking is disabled.
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// A product variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    #[serde(default)]
    pub id: Option<String>,
}

/// An additional info section (e.g., care instructions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoSection {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request body for the Stores product query endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ProductQueryRequest {
    pub query: ProductQuery,
}

/// Query-by-equality filter.
#[derive(Debug, Clone, Serialize)]
pub struct ProductQuery {
    /// Filter document, e.g. `{"slug": {"$eq": "midnight-tee"}}`.
    pub filter: serde_json::Value,
}

/// Response from the Stores product query endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductQueryResponse {
    #[serde(default)]
    pub products: Vec<Product>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_parses_with_unknown_fields_defaulted() {
        let json = r#"{"id":"cart-1","lineItems":[{"id":"li-1","quantity":2}],"currency":"USD"}"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.id.as_deref(), Some("cart-1"));
        assert_eq!(cart.line_item_count(), 1);
        assert_eq!(
            cart.line_items.first().and_then(|li| li.quantity),
            Some(2)
        );
    }

    #[test]
    fn test_line_item_input_omits_options_when_absent() {
        let input = LineItemInput {
            catalog_reference: CatalogReference {
                app_id: "app-1".to_string(),
                catalog_item_id: "prod123".to_string(),
                options: None,
            },
            quantity: 2,
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["catalogReference"]["catalogItemId"], "prod123");
        assert!(json["catalogReference"].get("options").is_none());
    }

    #[test]
    fn test_line_item_input_includes_variant_options() {
        let input = LineItemInput {
            catalog_reference: CatalogReference {
                app_id: "app-1".to_string(),
                catalog_item_id: "prod123".to_string(),
                options: Some(CatalogItemOptions {
                    variant_id: "var-9".to_string(),
                }),
            },
            quantity: 1,
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["catalogReference"]["options"]["variantId"], "var-9");
    }

    #[test]
    fn test_product_defaults_for_sparse_payload() {
        let json = r#"{"id":"p-1","name":"Midnight Tee"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.media.is_none());
        assert!(product.variants.is_empty());
        assert!(product.additional_info_sections.is_empty());
    }
}
