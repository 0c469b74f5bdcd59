use serde::{Deserialize, Serialize};

/// A node of the storefront's category taxonomy, as returned by the
/// category enumeration query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Opaque upstream identifier, passed back verbatim as the `catId` filter.
    pub id: String,
    pub name: String,
    /// Advertised number of products. May be stale or include products the
    /// storefront later filters out, so it is never treated as exact.
    /// `None` when the storefront does not report a count.
    pub product_count: Option<u64>,
}

impl Category {
    /// Returns `true` when the storefront advertises exactly zero products,
    /// meaning the category can be skipped without a round trip. An unknown
    /// count is not empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.product_count == Some(0)
    }
}

/// A category a product is filed under, as listed on the product itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub name: String,
    pub url_path: Option<String>,
    pub level: Option<u32>,
}

/// A product from either catalog source, normalized to one flat shape.
///
/// The sku is the only identity. The same product may appear more than once
/// in an aggregation when it belongs to several categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub sku: String,
    pub name: String,
    /// Whether the storefront currently sells the product (in stock).
    pub is_salable: bool,
    pub regular_price: f64,
    pub final_price: f64,
    /// ISO 4217 code when the source reports one.
    pub currency: Option<String>,
    pub weight: Option<f64>,
    pub url_key: Option<String>,
    pub image_url: Option<String>,
    pub categories: Vec<CategoryRef>,
}

impl ProductRecord {
    /// Returns `true` when the final price is below the regular price.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.final_price < self.regular_price
    }

    /// Names of every category the product lists, in source order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }
}
