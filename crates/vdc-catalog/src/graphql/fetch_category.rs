//! Page-by-page fetch of a single category for `GraphqlClient`.

use vdc_core::{Category, CategoryOutcome, ProductRecord};

use crate::normalize::normalize_product;

use super::GraphqlClient;

/// Upper bound on pages fetched for one category, guarding against a
/// runaway `total_pages`.
pub const MAX_PAGES: u32 = 500;

/// Records gathered for one category and how pagination ended.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryFetch {
    pub records: Vec<ProductRecord>,
    pub outcome: CategoryOutcome,
    pub pages_fetched: u32,
    /// Items dropped because they could not be normalized.
    pub rejected: usize,
}

impl CategoryFetch {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            outcome: CategoryOutcome::Complete,
            pages_fetched: 0,
            rejected: 0,
        }
    }
}

impl GraphqlClient {
    /// Fetches every page of `category`, in order, into one list.
    ///
    /// Empty categories return immediately without a request. Page 1 reports
    /// `total_pages`; pages `2..=total_pages` follow with the inter-request
    /// delay between them.
    ///
    /// **Best-effort semantics**: a page that fails after the client's own
    /// retries stops this category only. Pages already fetched are kept and
    /// the outcome is [`CategoryOutcome::PartialFailure`] naming the category
    /// and page.
    pub async fn fetch_category(&self, category: &Category, page_size: u32) -> CategoryFetch {
        if category.is_empty() {
            tracing::debug!(category = %category.name, "skipping category with no products");
            return CategoryFetch::empty();
        }

        let mut fetch = CategoryFetch::empty();
        let mut total_pages = 1u32;
        let mut page = 1u32;

        while page <= total_pages {
            if page > MAX_PAGES {
                let reason = format!(
                    "category \"{}\" stopped at page {page}: exceeded {MAX_PAGES} pages",
                    category.name
                );
                tracing::warn!(category = %category.name, page, total_pages, "pagination limit reached");
                fetch.outcome = CategoryOutcome::PartialFailure { page, reason };
                return fetch;
            }

            if page > 1 && !self.inter_request_delay.is_zero() {
                tokio::time::sleep(self.inter_request_delay).await;
            }

            let response = match self
                .fetch_products_page(&category.id, page_size, page)
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(
                        category = %category.name,
                        category_id = %category.id,
                        page,
                        error = %e,
                        "category page failed, keeping earlier pages"
                    );
                    let reason = format!(
                        "category \"{}\" (id {}) failed at page {page}: {e}",
                        category.name, category.id
                    );
                    fetch.outcome = CategoryOutcome::PartialFailure { page, reason };
                    return fetch;
                }
            };

            if page == 1 {
                total_pages = response.total_pages();
            }

            let item_count = response.items.len();
            for item in response.items {
                match normalize_product(item) {
                    Ok(record) => fetch.records.push(record),
                    Err(e) => {
                        tracing::warn!(category = %category.name, page, error = %e, "dropping product");
                        fetch.rejected += 1;
                    }
                }
            }
            fetch.pages_fetched += 1;

            tracing::info!(
                category = %category.name,
                page,
                total_pages,
                fetched = item_count,
                accumulated = fetch.records.len(),
                "fetched category page"
            );

            page += 1;
        }

        fetch
    }
}
