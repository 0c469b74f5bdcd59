mod graphql_proxy;
mod sheets_proxy;

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderName, Method},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use vdc_catalog::{GraphqlClient, SheetsClient};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub graphql: Arc<GraphqlClient>,
    /// `None` when no sheet endpoint is configured; the sheet proxy then
    /// answers with an error.
    pub sheets: Option<Arc<SheetsClient>>,
    /// Held for the duration of a `fetchAll` run so runs never overlap.
    pub run_token: Arc<Mutex<()>>,
}

impl AppState {
    #[must_use]
    pub fn new(graphql: GraphqlClient, sheets: Option<SheetsClient>) -> Self {
        Self {
            graphql: Arc::new(graphql),
            sheets: sheets.map(Arc::new),
            run_token: Arc::new(Mutex::new(())),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    request_id: String,
    timestamp: DateTime<Utc>,
}

/// Permissive CORS for the browser dashboard, applied to every response
/// including errors and pre-flight.
fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

pub fn build_app(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|req: &Request| {
        let request_id = req
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_default();
        tracing::info_span!(
            "http",
            method = %req.method(),
            path = %req.uri().path(),
            request_id = %request_id,
        )
    });

    Router::new()
        .route("/api/v1/health", get(health))
        .route(
            "/functions/v1/graphql-proxy",
            post(graphql_proxy::graphql_proxy),
        )
        .route(
            "/functions/v1/sheets-proxy",
            get(sheets_proxy::sheets_proxy_get).post(sheets_proxy::sheets_proxy),
        )
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id))
                .layer(trace),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> Json<HealthData> {
    Json(HealthData {
        status: "ok",
        request_id: req_id.0,
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
