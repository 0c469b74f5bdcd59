//! Dashboard KPIs computed over an already-aggregated product list.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::products::ProductRecord;

/// Number of categories kept in [`CatalogKpis::top_categories`].
pub const TOP_CATEGORY_LIMIT: usize = 15;

/// Half-open `[min, max)` price ranges; `None` means unbounded.
const PRICE_BUCKETS: [(f64, Option<f64>, &str); 6] = [
    (0.0, Some(500.0), "$0-500"),
    (500.0, Some(1_000.0), "$500-1K"),
    (1_000.0, Some(2_000.0), "$1K-2K"),
    (2_000.0, Some(5_000.0), "$2K-5K"),
    (5_000.0, Some(10_000.0), "$5K-10K"),
    (10_000.0, None, "$10K+"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBucket {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogKpis {
    pub total_products: usize,
    pub in_stock: usize,
    pub out_of_stock: usize,
    /// Sum of final prices over salable products.
    pub catalog_value: f64,
    pub top_categories: Vec<CategoryCount>,
    pub price_histogram: Vec<PriceBucket>,
}

impl CatalogKpis {
    /// Computes every KPI in one pass over `records`.
    ///
    /// Counts are per record, so a product duplicated across categories is
    /// counted once per occurrence, matching the aggregation output.
    #[must_use]
    pub fn from_records(records: &[ProductRecord]) -> Self {
        let mut in_stock = 0usize;
        let mut catalog_value = 0.0f64;
        let mut per_category: HashMap<&str, usize> = HashMap::new();
        let mut histogram = [0usize; PRICE_BUCKETS.len()];

        for record in records {
            if record.is_salable {
                in_stock += 1;
                catalog_value += record.final_price;
            }
            for name in record.category_names() {
                *per_category.entry(name).or_default() += 1;
            }
            if let Some(idx) = bucket_index(record.final_price) {
                histogram[idx] += 1;
            }
        }

        let mut top_categories: Vec<CategoryCount> = per_category
            .into_iter()
            .map(|(name, count)| CategoryCount {
                name: name.to_owned(),
                count,
            })
            .collect();
        // Name as tie-breaker keeps the output stable across runs.
        top_categories.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        top_categories.truncate(TOP_CATEGORY_LIMIT);

        let price_histogram = PRICE_BUCKETS
            .iter()
            .zip(histogram)
            .map(|((_, _, label), count)| PriceBucket {
                label: (*label).to_owned(),
                count,
            })
            .collect();

        Self {
            total_products: records.len(),
            in_stock,
            out_of_stock: records.len() - in_stock,
            catalog_value,
            top_categories,
            price_histogram,
        }
    }
}

fn bucket_index(price: f64) -> Option<usize> {
    PRICE_BUCKETS
        .iter()
        .position(|(min, max, _)| price >= *min && max.is_none_or(|max| price < max))
}
