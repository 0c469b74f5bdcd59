use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vdc_core::AggregationResult;

use crate::middleware::RequestId;

use super::AppState;

const FETCH_ALL: &str = "fetchAll";

#[derive(Debug, Deserialize)]
pub(super) struct GraphqlProxyRequest {
    action: Option<String>,
    query: Option<String>,
    #[serde(default)]
    variables: Option<Value>,
}

#[derive(Debug, Serialize)]
struct FetchAllResponse {
    products: AggregationResult,
}

/// `{"error": message}` with the status that fits the failure.
#[derive(Debug)]
pub(super) struct ProxyError {
    status: StatusCode,
    message: String,
}

impl ProxyError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

/// `action == "fetchAll"` runs a full aggregation; anything else forwards
/// `query`/`variables` and answers with the upstream `data`.
pub(super) async fn graphql_proxy(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<GraphqlProxyRequest>, JsonRejection>,
) -> Result<Response, ProxyError> {
    let Json(request) = payload.map_err(|rejection| {
        ProxyError::new(StatusCode::BAD_REQUEST, rejection.body_text())
    })?;

    if request.action.as_deref() == Some(FETCH_ALL) {
        let Ok(_run) = state.run_token.try_lock() else {
            tracing::warn!(request_id = %req_id.0, "fetchAll rejected, a run is already in progress");
            return Err(ProxyError::new(
                StatusCode::CONFLICT,
                "an aggregation run is already in progress",
            ));
        };

        tracing::info!(request_id = %req_id.0, "starting fetchAll");
        let products = state.graphql.aggregate_all().await.map_err(|e| {
            tracing::error!(request_id = %req_id.0, error = %e, "fetchAll failed");
            ProxyError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
        return Ok(Json(FetchAllResponse { products }).into_response());
    }

    let Some(query) = request.query.filter(|q| !q.trim().is_empty()) else {
        return Err(ProxyError::new(
            StatusCode::BAD_REQUEST,
            "request needs either action \"fetchAll\" or a query",
        ));
    };
    let variables = request
        .variables
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

    let data = state
        .graphql
        .query_raw(&query, variables)
        .await
        .map_err(|e| {
            tracing::error!(request_id = %req_id.0, error = %e, "graphql passthrough failed");
            ProxyError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    Ok(Json(data).into_response())
}
