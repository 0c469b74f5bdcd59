//! Result types of a batch aggregation run.

use serde::{Deserialize, Serialize};

use crate::products::ProductRecord;

/// How pagination of a single category ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CategoryOutcome {
    /// Every page was fetched (or the category was empty).
    Complete,
    /// Pagination stopped at `page`; earlier pages were kept.
    PartialFailure { page: u32, reason: String },
}

impl CategoryOutcome {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, CategoryOutcome::Complete)
    }
}

/// A category that stopped early, with the page that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFailure {
    pub category_id: String,
    pub category_name: String,
    pub page: u32,
    /// Human-readable reason naming the category and page.
    pub reason: String,
}

/// Flat product list plus the run summary.
///
/// `items` is ordered by category enumeration order, then page order, then
/// position within the page. Products filed under several categories appear
/// once per category.
///
/// `declared_product_count` is the sum of the advertised category counts
/// (unknown counts add nothing) and
/// routinely differs from `total_count` (partial failures, stale counts,
/// storefront-side filtering, duplicates). Both are reported as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub total_count: usize,
    pub items: Vec<ProductRecord>,
    pub categories_seen: usize,
    pub categories_skipped: usize,
    pub categories_completed: usize,
    pub declared_product_count: u64,
    /// Items dropped because they could not be normalized.
    pub records_rejected: usize,
    pub failures: Vec<CategoryFailure>,
}

impl AggregationResult {
    /// Returns `true` when no category stopped early.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failure_reasons(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.reason.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(CategoryOutcome::PartialFailure {
            page: 2,
            reason: "boom".to_string(),
        })
        .expect("serialize");
        assert_eq!(json["status"], "partial_failure");
        assert_eq!(json["page"], 2);
    }

    #[test]
    fn default_result_is_complete_and_empty() {
        let result = AggregationResult::default();
        assert!(result.is_complete());
        assert_eq!(result.total_count, 0);
        assert_eq!(result.failure_reasons().count(), 0);
    }

    #[test]
    fn result_with_failure_is_not_complete() {
        let result = AggregationResult {
            failures: vec![CategoryFailure {
                category_id: "7".to_string(),
                category_name: "Recamaras".to_string(),
                page: 2,
                reason: "category \"Recamaras\" stopped at page 2: timeout".to_string(),
            }],
            ..AggregationResult::default()
        };
        assert!(!result.is_complete());
        assert_eq!(
            result.failure_reasons().collect::<Vec<_>>(),
            vec!["category \"Recamaras\" stopped at page 2: timeout"]
        );
    }
}
