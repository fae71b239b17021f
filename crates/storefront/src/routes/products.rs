//! Product route handlers.
//!
//! The detail page looks a product up by its URL slug through the client
//! provider. Pure data-source consumption: no caching, no retry, only
//! display defaulting.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;
use crate::wix::types::Product;
use crate::wix::{ClientProvider, WixError};

/// Fallback image shown when a product has no main media.
const DEFAULT_PRODUCT_IMAGE: &str = "/static/product.svg";

/// Info section display data for templates.
#[derive(Clone)]
pub struct InfoSectionView {
    pub title: String,
    pub description: String,
}

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    /// HTML description, rendered unescaped.
    pub description: String,
    pub price: Option<f64>,
    pub discounted_price: Option<f64>,
    pub on_sale: bool,
    pub image_url: String,
    /// Variant submitted with add-to-cart; the zero UUID when the product
    /// has no variants.
    pub variant_id: String,
    pub in_stock: bool,
    pub stock_quantity: Option<u32>,
    pub info_sections: Vec<InfoSectionView>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let price = product.price.as_ref().and_then(|p| p.price);
        let discounted_price = product.price.as_ref().and_then(|p| p.discounted_price);
        let on_sale = matches!(
            (price, discounted_price),
            (Some(full), Some(sale)) if sale < full
        );

        let variant_id = product
            .variants
            .iter()
            .find_map(|v| v.id.clone())
            .unwrap_or_else(|| Uuid::nil().to_string());

        Self {
            id: product.id.unwrap_or_default(),
            name: product.name.unwrap_or_else(|| "Untitled".to_string()),
            description: product.description.unwrap_or_default(),
            price,
            discounted_price,
            on_sale,
            image_url: product
                .media
                .and_then(|m| m.main_media)
                .and_then(|m| m.image)
                .map_or_else(|| DEFAULT_PRODUCT_IMAGE.to_string(), |img| img.url),
            variant_id,
            // Inventory tracking is optional; absent stock data means sellable
            in_stock: product
                .stock
                .as_ref()
                .and_then(|s| s.in_stock)
                .unwrap_or(true),
            stock_quantity: product.stock.and_then(|s| s.quantity),
            info_sections: product
                .additional_info_sections
                .into_iter()
                .filter_map(|section| {
                    Some(InfoSectionView {
                        title: section.title?,
                        description: section.description.unwrap_or_default(),
                    })
                })
                .collect(),
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductView,
}

/// Display product detail page.
#[instrument(skip(state), fields(slug = %slug))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ProductShowTemplate> {
    let client = state.provider().client().await.map_err(AppError::Wix)?;

    let product = match client.product_by_slug(&slug).await {
        Ok(product) => product,
        Err(WixError::NotFound(_)) => {
            return Err(AppError::NotFound(format!("Product not found: {slug}")));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(ProductShowTemplate {
        product: ProductView::from(product),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::wix::types::{Image, Media, MediaItem, PriceData, Stock, Variant};

    fn bare_product() -> Product {
        serde_json::from_str("{}").unwrap()
    }

    #[test]
    fn test_view_defaults_for_bare_product() {
        let view = ProductView::from(bare_product());
        assert_eq!(view.name, "Untitled");
        assert_eq!(view.image_url, DEFAULT_PRODUCT_IMAGE);
        assert_eq!(view.variant_id, Uuid::nil().to_string());
        assert!(view.in_stock);
        assert_eq!(view.stock_quantity, None);
        assert!(!view.on_sale);
        assert!(view.info_sections.is_empty());
    }

    #[test]
    fn test_view_prefers_first_variant() {
        let mut product = bare_product();
        product.variants = vec![
            Variant { id: None },
            Variant {
                id: Some("var-1".to_string()),
            },
        ];
        let view = ProductView::from(product);
        assert_eq!(view.variant_id, "var-1");
    }

    #[test]
    fn test_view_sale_detection() {
        let mut product = bare_product();
        product.price = Some(PriceData {
            price: Some(30.0),
            discounted_price: Some(20.0),
        });
        assert!(ProductView::from(product.clone()).on_sale);

        product.price = Some(PriceData {
            price: Some(30.0),
            discounted_price: Some(30.0),
        });
        assert!(!ProductView::from(product).on_sale);
    }

    #[test]
    fn test_view_uses_main_media_and_stock() {
        let mut product = bare_product();
        product.media = Some(Media {
            main_media: Some(MediaItem {
                image: Some(Image {
                    url: "https://cdn.test/shirt.jpg".to_string(),
                }),
            }),
        });
        product.stock = Some(Stock {
            in_stock: Some(false),
            quantity: Some(0),
        });

        let view = ProductView::from(product);
        assert_eq!(view.image_url, "https://cdn.test/shirt.jpg");
        assert!(!view.in_stock);
        assert_eq!(view.stock_quantity, Some(0));
    }
}
