//! End-to-end aggregation runs against a mocked storefront.

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vdc_catalog::{CatalogError, ClientOptions, GraphqlClient, RetryPolicy};

fn client(server: &MockServer, page_size: u32) -> GraphqlClient {
    let options = ClientOptions {
        timeout_secs: 5,
        user_agent: "vdc-test/0.1".to_owned(),
        retry: RetryPolicy {
            max_retries: 2,
            backoff_base_ms: 1,
        },
        page_size,
        inter_request_delay: Duration::ZERO,
    };
    GraphqlClient::new(&format!("{}/graphql", server.uri()), &options)
        .expect("failed to build test GraphqlClient")
}

fn items(prefix: &str, range: std::ops::RangeInclusive<u32>) -> Vec<Value> {
    range
        .map(|n| {
            json!({
                "sku": format!("{prefix}-{n}"),
                "name": format!("{prefix} {n}"),
                "is_salable": n % 2 == 0,
                "price_range": {"minimum_price": {
                    "regular_price": {"value": 1500.0, "currency": "MXN"},
                    "final_price": {"value": 1500.0, "currency": "MXN"}
                }},
                "categories": [{"name": prefix, "url_path": prefix.to_lowercase(), "level": 2}]
            })
        })
        .collect()
}

fn page(total_pages: u32, items: Vec<Value>) -> Value {
    json!({
        "data": {"products": {
            "total_count": items.len(),
            "page_info": {"total_pages": total_pages},
            "items": items
        }}
    })
}

async fn mount_categories(server: &MockServer, categories: Value) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("categoryList"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"categoryList": categories}
        })))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, cat: &str, page_no: u32, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(
            json!({"variables": {"catId": cat, "currentPage": page_no}}),
        ))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Three categories: one empty, one single page, and one whose second page
/// fails permanently.
async fn mount_mixed_catalog(server: &MockServer) {
    mount_categories(
        server,
        json!([
            {"id": "A", "name": "Accesorios", "product_count": 0},
            {"id": "B", "name": "Bancos", "product_count": 5},
            {"id": "C", "name": "Comedores", "product_count": 12}
        ]),
    )
    .await;
    mount_page(
        server,
        "B",
        1,
        ResponseTemplate::new(200).set_body_json(page(1, items("B", 1..=5))),
    )
    .await;
    mount_page(
        server,
        "C",
        1,
        ResponseTemplate::new(200).set_body_json(page(2, items("C", 1..=10))),
    )
    .await;
    mount_page(
        server,
        "C",
        2,
        ResponseTemplate::new(400).set_body_string("page out of range"),
    )
    .await;
}

#[tokio::test]
async fn mixed_catalog_yields_partial_result() {
    let server = MockServer::start().await;
    mount_mixed_catalog(&server).await;

    let result = client(&server, 10).aggregate_all().await.unwrap();

    assert_eq!(result.total_count, 15);
    assert_eq!(result.items.len(), 15);
    assert_eq!(result.categories_seen, 3);
    assert_eq!(result.categories_skipped, 1);
    assert_eq!(result.categories_completed, 1);
    assert_eq!(result.declared_product_count, 17);
    assert_eq!(result.failures.len(), 1);

    let failure = &result.failures[0];
    assert_eq!(failure.category_id, "C");
    assert_eq!(failure.category_name, "Comedores");
    assert_eq!(failure.page, 2);
    assert!(failure.reason.contains("Comedores"), "reason: {}", failure.reason);
    assert!(failure.reason.contains("400"), "reason: {}", failure.reason);
    assert!(!result.is_complete());

    let first_c = result.items.iter().position(|r| r.sku.starts_with("C-"));
    assert_eq!(first_c, Some(5), "category order must be preserved");
}

#[tokio::test]
async fn empty_category_is_never_requested() {
    let server = MockServer::start().await;
    mount_mixed_catalog(&server).await;

    client(&server, 10).aggregate_all().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let touched_a = requests
        .iter()
        .filter_map(|r| r.body_json::<Value>().ok())
        .any(|b| b["variables"]["catId"] == "A");
    assert!(!touched_a);
}

#[tokio::test]
async fn identical_upstream_yields_identical_serialization() {
    let server = MockServer::start().await;
    mount_mixed_catalog(&server).await;
    let client = client(&server, 10);

    let first = client.aggregate_all().await.unwrap();
    let second = client.aggregate_all().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn shared_product_is_kept_once_per_category() {
    let server = MockServer::start().await;
    mount_categories(
        &server,
        json!([
            {"id": "1", "name": "Salas", "product_count": 1},
            {"id": "2", "name": "Ofertas", "product_count": 1}
        ]),
    )
    .await;
    for cat in ["1", "2"] {
        mount_page(
            &server,
            cat,
            1,
            ResponseTemplate::new(200).set_body_json(page(1, items("SOFA", 1..=1))),
        )
        .await;
    }

    let result = client(&server, 10).aggregate_all().await.unwrap();

    assert_eq!(result.total_count, 2);
    assert!(result.items.iter().all(|r| r.sku == "SOFA-1"));
}

#[tokio::test]
async fn failed_enumeration_aborts_run() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let err = client(&server, 10).aggregate_all().await.unwrap_err();

    match err {
        CatalogError::Enumeration(inner) => {
            assert!(matches!(*inner, CatalogError::TransientStatus { status: 503, .. }));
        }
        other => panic!("expected Enumeration, got: {other:?}"),
    }
}

#[tokio::test]
async fn category_with_unknown_count_is_fetched() {
    let server = MockServer::start().await;
    mount_categories(
        &server,
        json!([{"id": 2, "name": "Raiz", "product_count": null}]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(
            json!({"variables": {"catId": "2", "currentPage": 1}}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1, items("R", 1..=1))))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server, 10).aggregate_all().await.unwrap();

    assert_eq!(result.total_count, 1);
    assert_eq!(result.items[0].sku, "R-1");
    assert_eq!(result.categories_skipped, 0);
    assert_eq!(result.categories_completed, 1);
    assert_eq!(result.declared_product_count, 0);
}
