//! GraphQL storefront response types.
//!
//! ## Observed shape
//!
//! ### Category ids
//! `categoryList` returns `id` as an integer while the products filter takes
//! `category_id: { eq: String }`. Both forms are accepted and kept as a string.
//!
//! ### `product_count`
//! Usually present; `null` for some root categories. A null count is
//! unknown, not zero, so those categories are still fetched.
//!
//! ### `page_info.total_pages`
//! Reported on every page. Only the first page's value is used. `0` or
//! absent means a single page.
//!
//! ### Prices
//! `price_range.minimum_price.{regular_price,final_price}.value` are numbers;
//! `currency` is an ISO code such as `"MXN"`.
//!
//! ### `weight`
//! Only physical products expose it (`... on PhysicalProductInterface`).

use serde::{Deserialize, Deserializer};

/// `data` member of the category enumeration query.
#[derive(Debug, Deserialize)]
pub struct CategoryListData {
    #[serde(rename = "categoryList", default)]
    pub category_list: Option<Vec<GraphqlCategory>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlCategory {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub product_count: Option<u64>,
}

/// `data` member of the per-category products query.
#[derive(Debug, Deserialize)]
pub struct ProductsData {
    pub products: ProductsPage,
}

#[derive(Debug, Deserialize)]
pub struct ProductsPage {
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub page_info: Option<PageInfo>,
    #[serde(default)]
    pub items: Vec<GraphqlProduct>,
}

impl ProductsPage {
    /// Total pages advertised for the category; `0` or absent becomes `1`.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.page_info
            .as_ref()
            .and_then(|p| p.total_pages)
            .unwrap_or(0)
            .max(1)
    }
}

#[derive(Debug, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlProduct {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_salable: Option<bool>,
    #[serde(default)]
    pub url_key: Option<String>,
    #[serde(default)]
    pub url_suffix: Option<String>,
    #[serde(default)]
    pub small_image: Option<ProductImage>,
    #[serde(default)]
    pub image: Option<ProductImage>,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
    #[serde(default)]
    pub categories: Option<Vec<GraphqlCategoryRef>>,
    #[serde(default)]
    pub weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ProductImage {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PriceRange {
    pub minimum_price: MinimumPrice,
}

#[derive(Debug, Deserialize)]
pub struct MinimumPrice {
    pub regular_price: Money,
    pub final_price: Money,
}

#[derive(Debug, Deserialize)]
pub struct Money {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlCategoryRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url_path: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Str(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Int(n) => n.to_string(),
        RawId::Str(s) => s,
    })
}
