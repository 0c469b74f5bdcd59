//! Storefront command handlers: batch aggregation, category listing, KPIs.

use vdc_catalog::{ClientOptions, GraphqlClient};
use vdc_core::{AppConfig, CatalogKpis};

use crate::{print_json, KpiSource};

pub(crate) fn build_graphql_client(config: &AppConfig) -> anyhow::Result<GraphqlClient> {
    let options = ClientOptions::from_app_config(config);
    Ok(GraphqlClient::new(&config.graphql_endpoint, &options)?)
}

/// Runs a full aggregation and prints the [`vdc_core::AggregationResult`].
///
/// Incomplete categories do not fail the command; they are listed in the
/// output's `failures` and logged.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the category list
/// cannot be fetched.
pub(crate) async fn run_aggregate(config: &AppConfig, pretty: bool) -> anyhow::Result<()> {
    let client = build_graphql_client(config)?;
    let result = client.aggregate_all().await?;
    if !result.is_complete() {
        tracing::warn!(
            failed_categories = result.failures.len(),
            "aggregation finished with incomplete categories"
        );
    }
    print_json(&result, pretty)
}

pub(crate) async fn run_categories(config: &AppConfig, pretty: bool) -> anyhow::Result<()> {
    let client = build_graphql_client(config)?;
    let categories = client.list_categories().await?;
    print_json(&categories, pretty)
}

/// Computes [`CatalogKpis`] from either the storefront aggregation or the
/// product sheet.
///
/// # Errors
///
/// Returns an error if the chosen source cannot be read, or if `source` is
/// the sheet and no sheet endpoint is configured.
pub(crate) async fn run_kpis(
    config: &AppConfig,
    source: KpiSource,
    pretty: bool,
) -> anyhow::Result<()> {
    let records = match source {
        KpiSource::Graphql => build_graphql_client(config)?.aggregate_all().await?.items,
        KpiSource::Sheets => {
            crate::sheets::build_sheets_client(config)?
                .fetch_records()
                .await?
        }
    };

    let kpis = CatalogKpis::from_records(&records);
    tracing::info!(
        total_products = kpis.total_products,
        in_stock = kpis.in_stock,
        "computed catalog KPIs"
    );
    print_json(&kpis, pretty)
}
