//! Batch aggregation across every category.
//!
//! Categories are processed one at a time, in enumeration order, to stay
//! under the upstream's implicit rate limit. A category that fails part-way
//! keeps its partial records; only a failed enumeration aborts the run.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use vdc_core::{AggregationResult, Category, CategoryFailure, CategoryOutcome};

use crate::error::CatalogError;
use crate::graphql::CategoryFetch;

/// Where an aggregation run gets its categories and products.
pub trait CatalogSource {
    /// Lists every category in upstream order.
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, CatalogError>> + Send;

    /// Fetches all pages of one category. Never fails; errors surface as a
    /// partial-failure outcome.
    fn fetch_category(
        &self,
        category: &Category,
        page_size: u32,
    ) -> impl Future<Output = CategoryFetch> + Send;
}

/// Lifecycle of one run, logged at each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    EnumeratingCategories,
    Fetching { index: usize, of: usize },
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::EnumeratingCategories => write!(f, "enumerating_categories"),
            RunState::Fetching { index, of } => write!(f, "fetching({}/{of})", index + 1),
            RunState::Done => write!(f, "done"),
        }
    }
}

/// Per-run accumulator. Each step consumes it and returns the next one, so
/// no state outlives the run.
#[derive(Debug, Default)]
struct RunAccumulator {
    result: AggregationResult,
}

impl RunAccumulator {
    fn new(categories: &[Category]) -> Self {
        Self {
            result: AggregationResult {
                categories_seen: categories.len(),
                declared_product_count: categories.iter().filter_map(|c| c.product_count).sum(),
                ..AggregationResult::default()
            },
        }
    }

    fn skip(mut self) -> Self {
        self.result.categories_skipped += 1;
        self
    }

    fn absorb(mut self, category: &Category, fetch: CategoryFetch) -> Self {
        self.result.items.extend(fetch.records);
        self.result.records_rejected += fetch.rejected;
        match fetch.outcome {
            CategoryOutcome::Complete => self.result.categories_completed += 1,
            CategoryOutcome::PartialFailure { page, reason } => {
                self.result.failures.push(CategoryFailure {
                    category_id: category.id.clone(),
                    category_name: category.name.clone(),
                    page,
                    reason,
                });
            }
        }
        self
    }

    fn finish(mut self) -> AggregationResult {
        self.result.total_count = self.result.items.len();
        self.result
    }
}

/// Enumerates categories from `source` and fetches each non-empty one in
/// order, sleeping `inter_category_delay` between fetched categories.
///
/// Products listed under several categories are kept once per category.
///
/// # Errors
///
/// Returns [`CatalogError::Enumeration`] if the category list cannot be
/// fetched. Per-category failures never fail the run; they are listed in
/// [`AggregationResult::failures`].
pub async fn aggregate_all<S>(
    source: &S,
    page_size: u32,
    inter_category_delay: Duration,
) -> Result<AggregationResult, CatalogError>
where
    S: CatalogSource + Sync,
{
    tracing::info!(state = %RunState::EnumeratingCategories, "aggregation run started");
    let categories = source
        .list_categories()
        .await
        .map_err(|e| CatalogError::Enumeration(Box::new(e)))?;

    let total = categories.len();
    let mut acc = RunAccumulator::new(&categories);

    for (index, category) in categories.iter().enumerate() {
        if category.is_empty() {
            tracing::info!(category = %category.name, "skipping category with no products");
            acc = acc.skip();
            continue;
        }

        tracing::info!(
            state = %RunState::Fetching { index, of: total },
            category = %category.name,
            product_count = ?category.product_count,
            "fetching category"
        );
        let fetch = source.fetch_category(category, page_size).await;
        acc = acc.absorb(category, fetch);

        let more_to_fetch = categories[index + 1..].iter().any(|c| !c.is_empty());
        if more_to_fetch && !inter_category_delay.is_zero() {
            tokio::time::sleep(inter_category_delay).await;
        }
    }

    let result = acc.finish();
    tracing::info!(
        state = %RunState::Done,
        total_count = result.total_count,
        declared_product_count = result.declared_product_count,
        categories_seen = result.categories_seen,
        categories_skipped = result.categories_skipped,
        categories_completed = result.categories_completed,
        categories_failed = result.failures.len(),
        records_rejected = result.records_rejected,
        "aggregation run finished"
    );
    for failure in &result.failures {
        tracing::warn!(reason = %failure.reason, "category incomplete");
    }

    Ok(result)
}
