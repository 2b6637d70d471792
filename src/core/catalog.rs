//! Retailer catalog integration - candidate parts for the builder.
//!
//! [`CatalogSource`] is the seam between the builder and wherever product data
//! comes from. [`RetailerCatalog`] talks to the retailer's catalog API (directly
//! or through a proxy). Callers use [`load_candidates`] / [`fetch_with_fallback`],
//! which substitute the built-in table whenever the source fails or comes back
//! empty.

use crate::{
    config::services::RetailerConfig,
    core::{
        fallback::fallback_parts,
        part::{Category, Part, PartDetails},
        part_info::{PriceTier, extract_specs, recommendation},
    },
    errors::{Error, Result},
};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Default number of products requested per category.
pub const DEFAULT_LIMIT: usize = 10;

/// Upper bound on products requested per category.
pub const MAX_LIMIT: usize = 50;

/// Public origin of the retailer, used to absolutize product links.
pub const RETAILER_ORIGIN: &str = "https://www.bigbang.hr";

/// Supplies candidate parts for a category.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetches up to `limit` parts for `category`.
    ///
    /// May fail or return an empty list; callers decide on a fallback.
    async fn fetch_category(&self, category: Category, limit: usize) -> Result<Vec<Part>>;
}

/// Retailer category id for each build category.
#[must_use]
pub const fn retailer_category_id(category: Category) -> &'static str {
    match category {
        Category::Cpu => "593",
        Category::Gpu => "594",
        Category::Ram => "595",
        Category::Motherboard => "592",
        Category::Storage => "597",
        Category::Case => "599",
        Category::Psu => "600",
    }
}

const RESPONSE_FIELDS: [&str; 10] = [
    "id",
    "title",
    "basic_price_custom",
    "discount_percent_custom",
    "url_without_domain",
    "main_image_upload_path",
    "manufacturer_title",
    "category_title",
    "available_qty",
    "short_description",
];

#[derive(Debug, Serialize)]
struct CatalogRequest<'a> {
    mode: &'static str,
    related_widget_data: WidgetData<'a>,
    only_available: bool,
    limit: usize,
    response_fields: &'static [&'static str],
    lang: &'static str,
}

#[derive(Debug, Serialize)]
struct WidgetData<'a> {
    category_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    data: Option<CatalogData>,
}

#[derive(Debug, Deserialize)]
struct CatalogData {
    #[serde(default)]
    items: Vec<CatalogItem>,
}

/// One product as returned by the retailer API.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CatalogItem {
    #[serde(deserialize_with = "lenient_string")]
    id: Option<String>,
    title: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    basic_price_custom: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    discount_percent_custom: Option<f64>,
    url_without_domain: Option<String>,
    main_image_upload_path: Option<String>,
    manufacturer_title: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    available_qty: Option<f64>,
    short_description: Option<String>,
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) if !text.is_empty() => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

impl CatalogItem {
    /// Converts a retailer item into a part of `category`.
    ///
    /// The part price is the list price after discount. Items without a usable
    /// price or id are dropped.
    #[must_use]
    pub fn into_part(self, category: Category) -> Option<Part> {
        let id = self.id?;
        let list_price = self.basic_price_custom.filter(|price| price.is_finite() && *price >= 0.0)?;
        let discount = self.discount_percent_custom.unwrap_or(0.0).clamp(0.0, 100.0);
        let price = list_price * (1.0 - discount / 100.0);
        let name = self.title.unwrap_or_else(|| "Unknown".to_string());
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let stock = self.available_qty.unwrap_or(0.0).max(0.0) as u32;

        Some(Part {
            id,
            brand: self
                .manufacturer_title
                .filter(|brand| !brand.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            price,
            category,
            details: PartDetails {
                specs: extract_specs(&name),
                list_price: Some(list_price),
                discount_percent: Some(discount),
                url: self.url_without_domain.map_or_else(
                    || RETAILER_ORIGIN.to_string(),
                    |path| format!("{RETAILER_ORIGIN}{path}"),
                ),
                image: self
                    .main_image_upload_path
                    .map(|path| format!("{RETAILER_ORIGIN}{path}"))
                    .unwrap_or_default(),
                in_stock: stock > 0,
                stock,
                description: self.short_description.unwrap_or_default(),
                reason: Some(recommendation(category, PriceTier::for_price(price)).to_string()),
            },
            name,
        })
    }
}

/// HTTP client for the retailer catalog API.
#[derive(Debug, Clone)]
pub struct RetailerCatalog {
    client: reqwest::Client,
    config: RetailerConfig,
}

impl RetailerCatalog {
    /// Creates a catalog client using the given endpoint settings.
    #[must_use]
    pub const fn new(client: reqwest::Client, config: RetailerConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl CatalogSource for RetailerCatalog {
    async fn fetch_category(&self, category: Category, limit: usize) -> Result<Vec<Part>> {
        let payload = CatalogRequest {
            mode: "widget",
            related_widget_data: WidgetData {
                category_id: retailer_category_id(category),
            },
            only_available: true,
            limit: limit.clamp(1, MAX_LIMIT),
            response_fields: &RESPONSE_FIELDS,
            lang: "hr",
        };

        let mut request = self
            .client
            .post(&self.config.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        debug!("Fetching {} products for category {}", payload.limit, category);
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                service: "retailer catalog",
                status: status.as_u16(),
            });
        }

        let body: CatalogResponse = response.json().await?;
        Ok(body
            .data
            .map(|data| data.items)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| item.into_part(category))
            .collect())
    }
}

/// Fetches a category, substituting the built-in table on failure or an empty result.
pub async fn fetch_with_fallback(
    source: &dyn CatalogSource,
    category: Category,
    limit: usize,
) -> Vec<Part> {
    match source.fetch_category(category, limit).await {
        Ok(parts) if !parts.is_empty() => parts,
        Ok(_) => {
            warn!("Catalog returned no products for {category}, using fallback list");
            fallback_parts(category)
        }
        Err(e) => {
            warn!("Catalog fetch for {category} failed, using fallback list: {e}");
            fallback_parts(category)
        }
    }
}

/// Candidate lists for every category, each guaranteed non-empty.
pub async fn load_candidates(source: &dyn CatalogSource, limit: usize) -> BTreeMap<Category, Vec<Part>> {
    let mut candidates = BTreeMap::new();
    for category in Category::ALL {
        candidates.insert(category, fetch_with_fallback(source, category, limit).await);
    }
    candidates
}

/// Response of the product listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ProductListing {
    /// Whether live products were returned
    pub success: bool,
    /// Requested category name as given
    pub category: String,
    /// Number of products
    pub count: usize,
    /// The products
    pub products: Vec<Part>,
}

/// Live product listing for a category name.
///
/// Never fails: unknown categories and upstream errors produce an empty,
/// unsuccessful listing so the client can use its own fallback.
pub async fn list_products(source: &dyn CatalogSource, category: &str, limit: Option<usize>) -> ProductListing {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let empty = || ProductListing {
        success: false,
        category: category.to_string(),
        count: 0,
        products: Vec::new(),
    };

    let Ok(parsed) = category.parse::<Category>() else {
        return empty();
    };

    match source.fetch_category(parsed, limit).await {
        Ok(products) if !products.is_empty() => ProductListing {
            success: true,
            category: category.to_string(),
            count: products.len(),
            products,
        },
        Ok(_) => empty(),
        Err(e) => {
            warn!("[{category}] product listing failed: {e}");
            empty()
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{FailingCatalog, FixedCatalog, StaticCatalog};

    #[test]
    fn test_item_into_part_applies_discount() {
        let item: CatalogItem = serde_json::from_value(serde_json::json!({
            "id": 42,
            "title": "AMD Ryzen 5 5600 6C/12T 4.4GHz",
            "basic_price_custom": "200",
            "discount_percent_custom": 10,
            "url_without_domain": "/p/ryzen-5",
            "main_image_upload_path": "/img/ryzen.png",
            "manufacturer_title": "AMD",
            "available_qty": 3,
        }))
        .unwrap();

        let part = item.into_part(Category::Cpu).unwrap();
        assert_eq!(part.id, "42");
        assert_eq!(part.price, 180.0);
        assert_eq!(part.details.list_price, Some(200.0));
        assert_eq!(part.details.url, "https://www.bigbang.hr/p/ryzen-5");
        assert_eq!(part.details.image, "https://www.bigbang.hr/img/ryzen.png");
        assert_eq!(part.details.specs, "6C/12T, 4.4GHz");
        assert!(part.details.in_stock);
        assert_eq!(part.details.stock, 3);
    }

    #[test]
    fn test_item_defaults() {
        let item: CatalogItem = serde_json::from_value(serde_json::json!({
            "id": "x1",
            "basic_price_custom": 59.9,
        }))
        .unwrap();

        let part = item.into_part(Category::Ram).unwrap();
        assert_eq!(part.name, "Unknown");
        assert_eq!(part.brand, "Unknown");
        assert_eq!(part.details.url, RETAILER_ORIGIN);
        assert!(part.details.image.is_empty());
        assert!(!part.details.in_stock);
    }

    #[test]
    fn test_item_without_price_is_dropped() {
        let item: CatalogItem = serde_json::from_value(serde_json::json!({
            "id": "x1",
            "basic_price_custom": "n/a",
        }))
        .unwrap();
        assert!(item.into_part(Category::Ram).is_none());
    }

    #[tokio::test]
    async fn test_fetch_with_fallback_on_error() {
        let parts = fetch_with_fallback(&FailingCatalog, Category::Gpu, 10).await;
        assert_eq!(parts, fallback_parts(Category::Gpu));
    }

    #[tokio::test]
    async fn test_fetch_with_fallback_on_empty() {
        let catalog = FixedCatalog::new(BTreeMap::new());
        let parts = fetch_with_fallback(&catalog, Category::Case, 10).await;
        assert_eq!(parts, fallback_parts(Category::Case));
    }

    #[tokio::test]
    async fn test_load_candidates_fills_every_category() {
        let live = vec![Part::new("live-1", "RTX 4070", "NVIDIA", 600.0, Category::Gpu)];
        let catalog = FixedCatalog::new(BTreeMap::from([(Category::Gpu, live.clone())]));
        let candidates = load_candidates(&catalog, 10).await;

        assert_eq!(candidates.len(), Category::ALL.len());
        assert_eq!(candidates[&Category::Gpu], live);
        assert_eq!(candidates[&Category::Cpu], fallback_parts(Category::Cpu));
    }

    #[tokio::test]
    async fn test_list_products_unknown_category() {
        let listing = list_products(&StaticCatalog, "monitor", None).await;
        assert!(!listing.success);
        assert_eq!(listing.category, "monitor");
        assert_eq!(listing.count, 0);
    }

    #[tokio::test]
    async fn test_list_products_upstream_failure() {
        let listing = list_products(&FailingCatalog, "cpu", Some(5)).await;
        assert!(!listing.success);
        assert!(listing.products.is_empty());
    }

    #[tokio::test]
    async fn test_list_products_respects_limit() {
        let listing = list_products(&StaticCatalog, "case", Some(2)).await;
        assert!(listing.success);
        assert_eq!(listing.count, 2);
        assert_eq!(listing.products.len(), 2);
    }
}
