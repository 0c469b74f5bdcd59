use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use vdc_catalog::{ClientOptions, GraphqlClient, RetryPolicy, SheetsClient};
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn options() -> ClientOptions {
    ClientOptions {
        timeout_secs: 5,
        user_agent: "vdc-test/0.1".to_owned(),
        retry: RetryPolicy::none(),
        page_size: 10,
        inter_request_delay: Duration::ZERO,
    }
}

fn state_for(server: &MockServer, with_sheets: bool) -> AppState {
    let graphql = GraphqlClient::new(&format!("{}/graphql", server.uri()), &options())
        .expect("graphql client");
    let sheets = with_sheets.then(|| {
        SheetsClient::new(&format!("{}/exec", server.uri()), &options()).expect("sheets client")
    });
    AppState::new(graphql, sheets)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("origin", "http://localhost:5173")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json parse")
}

fn assert_cors(response: &axum::response::Response) {
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

async fn mount_single_category(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("categoryList"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"categoryList": [
                {"id": "1", "name": "Vacia", "product_count": 0},
                {"id": "2", "name": "Salas", "product_count": 1}
            ]}
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("GetProductsByCategory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"products": {
                "total_count": 1,
                "page_info": {"current_page": 1, "total_pages": 1},
                "items": [{
                    "sku": "SALA-1",
                    "name": "Sala modular",
                    "is_salable": true,
                    "price_range": {"minimum_price": {
                        "regular_price": {"value": 15000.0, "currency": "MXN"},
                        "final_price": {"value": 12999.0, "currency": "MXN"}
                    }},
                    "categories": [{"name": "Salas"}]
                }]
            }}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn health_returns_ok_with_request_id() {
    let server = MockServer::start().await;
    let app = build_app(state_for(&server, false));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("req-123")
    );
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["request_id"], "req-123");
}

#[tokio::test]
async fn preflight_allows_dashboard_headers() {
    let server = MockServer::start().await;
    let app = build_app(state_for(&server, false));

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/functions/v1/graphql-proxy")
                .header("origin", "http://localhost:5173")
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "apikey, content-type")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    let allowed = response
        .headers()
        .get("access-control-allow-headers")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    for header in ["authorization", "x-client-info", "apikey", "content-type"] {
        assert!(allowed.contains(header), "missing {header} in {allowed}");
    }
}

#[tokio::test]
async fn fetch_all_returns_aggregation_result() {
    let server = MockServer::start().await;
    mount_single_category(&server).await;
    let app = build_app(state_for(&server, false));

    let response = app
        .oneshot(post_json(
            "/functions/v1/graphql-proxy",
            &json!({"action": "fetchAll"}),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    let body = json_body(response).await;
    assert_eq!(body["products"]["total_count"], 1);
    assert_eq!(body["products"]["items"][0]["sku"], "SALA-1");
    assert_eq!(body["products"]["categories_skipped"], 1);
    assert_eq!(body["products"]["failures"], json!([]));
}

#[tokio::test]
async fn overlapping_fetch_all_is_rejected() {
    let server = MockServer::start().await;
    let state = state_for(&server, false);
    let _running = state.run_token.lock().await;
    let app = build_app(state.clone());

    let response = app
        .oneshot(post_json(
            "/functions/v1/graphql-proxy",
            &json!({"action": "fetchAll"}),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_cors(&response);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("already in progress"));
}

#[tokio::test]
async fn raw_query_returns_upstream_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_json(json!({
            "query": "{ storeConfig { store_name } }",
            "variables": {}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"storeConfig": {"store_name": "Villa de Cortes"}}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let app = build_app(state_for(&server, false));

    let response = app
        .oneshot(post_json(
            "/functions/v1/graphql-proxy",
            &json!({"query": "{ storeConfig { store_name } }"}),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["storeConfig"]["store_name"], "Villa de Cortes");
}

#[tokio::test]
async fn missing_query_is_bad_request() {
    let server = MockServer::start().await;
    let app = build_app(state_for(&server, false));

    let response = app
        .oneshot(post_json("/functions/v1/graphql-proxy", &json!({})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_cors(&response);
    let body = json_body(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn upstream_failure_maps_to_internal_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Syntax Error"))
        .mount(&server)
        .await;
    let app = build_app(state_for(&server, false));

    let response = app
        .oneshot(post_json(
            "/functions/v1/graphql-proxy",
            &json!({"query": "{ broken"}),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&response);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("400"));
}

#[tokio::test]
async fn fetch_all_enumeration_failure_is_internal_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let app = build_app(state_for(&server, false));

    let response = app
        .oneshot(post_json(
            "/functions/v1/graphql-proxy",
            &json!({"action": "fetchAll"}),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn sheets_proxy_without_endpoint_reports_failure() {
    let server = MockServer::start().await;
    let app = build_app(state_for(&server, false));

    let response = app
        .oneshot(post_json(
            "/functions/v1/sheets-proxy",
            &json!({"method": "GET"}),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&response);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Error al conectar con Google Sheets");
    assert!(body["error"].as_str().unwrap().contains("not configured"));
}

#[tokio::test]
async fn sheets_proxy_get_returns_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/exec"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"sku": "MS-01", "nombre": "Mesa", "existencia": true,
             "precio_regular": 4500.0, "precio_final": 3999.0}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    let app = build_app(state_for(&server, true));

    let response = app
        .oneshot(post_json("/functions/v1/sheets-proxy", &json!({})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"][0]["sku"], "MS-01");
}

#[tokio::test]
async fn sheets_proxy_forwards_action() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/exec"))
        .and(body_json(json!({"action": "enable_auto_update"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Actualizacion automatica activada"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let app = build_app(state_for(&server, true));

    let response = app
        .oneshot(post_json(
            "/functions/v1/sheets-proxy",
            &json!({"method": "POST", "action": "enable_auto_update"}),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Actualizacion automatica activada");
}

#[tokio::test]
async fn sheets_proxy_rejects_unknown_action() {
    let server = MockServer::start().await;
    let app = build_app(state_for(&server, true));

    let response = app
        .oneshot(post_json(
            "/functions/v1/sheets-proxy",
            &json!({"action": "delete_sheet"}),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("delete_sheet"));
}
