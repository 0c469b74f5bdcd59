//! Client for the storefront's GraphQL endpoint.

mod fetch_category;
mod queries;

use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use vdc_core::{AggregationResult, Category};

use crate::client::{ClientOptions, HttpClient};
use crate::error::CatalogError;
use crate::types::{CategoryListData, ProductsData, ProductsPage};

pub use fetch_category::{CategoryFetch, MAX_PAGES};

/// GraphQL storefront client: category enumeration, paginated product
/// fetches, and raw query passthrough, all over one retrying [`HttpClient`].
pub struct GraphqlClient {
    http: HttpClient,
    endpoint: Url,
    page_size: u32,
    inter_request_delay: Duration,
}

impl GraphqlClient {
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidEndpoint`] if `endpoint` is not a valid
    /// URL, or [`CatalogError::Http`] if the HTTP client cannot be built.
    pub fn new(endpoint: &str, options: &ClientOptions) -> Result<Self, CatalogError> {
        let endpoint = Url::parse(endpoint).map_err(|e| CatalogError::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            http: HttpClient::new(options)?,
            endpoint,
            page_size: options.page_size.max(1),
            inter_request_delay: options.inter_request_delay,
        })
    }

    /// Posts an arbitrary query and returns its `data` member.
    ///
    /// # Errors
    ///
    /// Propagates [`HttpClient::post_json`] errors; returns
    /// [`CatalogError::Application`] when the response has no `data`.
    pub async fn query_raw(&self, query: &str, variables: Value) -> Result<Value, CatalogError> {
        let body = self
            .http
            .post_json(&self.endpoint, &json!({ "query": query, "variables": variables }))
            .await?;

        match body {
            Value::Object(mut map) => match map.remove("data") {
                Some(data) if !data.is_null() => Ok(data),
                _ => Err(CatalogError::Application(
                    "GraphQL response has no data".to_owned(),
                )),
            },
            _ => Err(CatalogError::Application(
                "GraphQL response is not an object".to_owned(),
            )),
        }
    }

    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        context: &str,
    ) -> Result<T, CatalogError> {
        let data = self.query_raw(query, variables).await?;
        serde_json::from_value(data).map_err(|e| CatalogError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    /// Lists every category with its advertised product count, in upstream
    /// order. The list is expected to fit one response.
    ///
    /// # Errors
    ///
    /// Propagates any request or deserialization error unchanged.
    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let data: CategoryListData = self
            .query(queries::CATEGORIES, json!({}), "categoryList")
            .await?;

        let categories: Vec<Category> = data
            .category_list
            .unwrap_or_default()
            .into_iter()
            .map(|c| Category {
                name: c.name.unwrap_or_else(|| format!("category {}", c.id)),
                id: c.id,
                product_count: c.product_count,
            })
            .collect();

        tracing::info!(count = categories.len(), "fetched category list");
        Ok(categories)
    }

    /// Fetches one page (1-based) of a category's products.
    ///
    /// # Errors
    ///
    /// Propagates any request or deserialization error.
    pub async fn fetch_products_page(
        &self,
        category_id: &str,
        page_size: u32,
        page: u32,
    ) -> Result<ProductsPage, CatalogError> {
        let data: ProductsData = self
            .query(
                queries::PRODUCTS_BY_CATEGORY,
                json!({
                    "catId": category_id,
                    "pageSize": page_size,
                    "currentPage": page,
                }),
                &format!("products(category={category_id}, page={page})"),
            )
            .await?;
        Ok(data.products)
    }

    /// Runs a full batch aggregation with this client's page size and
    /// inter-request delay.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Enumeration`] if the category list cannot be
    /// fetched. Per-category failures are reported in the result instead.
    pub async fn aggregate_all(&self) -> Result<AggregationResult, CatalogError> {
        crate::aggregate::aggregate_all(self, self.page_size, self.inter_request_delay).await
    }
}

impl crate::aggregate::CatalogSource for GraphqlClient {
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        GraphqlClient::list_categories(self).await
    }

    async fn fetch_category(&self, category: &Category, page_size: u32) -> CategoryFetch {
        GraphqlClient::fetch_category(self, category, page_size).await
    }
}
