use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use vdc_catalog::{SheetsAction, SheetsClient};

use crate::middleware::RequestId;

use super::AppState;

const CONNECT_FAILURE_MESSAGE: &str = "Error al conectar con Google Sheets";

#[derive(Debug, Default, Deserialize)]
pub(super) struct SheetsProxyRequest {
    method: Option<String>,
    action: Option<String>,
}

#[derive(Debug, Serialize)]
struct SheetsErrorBody {
    success: bool,
    error: String,
    message: &'static str,
}

#[derive(Debug)]
pub(super) struct SheetsProxyError {
    status: StatusCode,
    error: String,
}

impl SheetsProxyError {
    fn internal(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: error.into(),
        }
    }

    fn bad_request(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
        }
    }
}

impl IntoResponse for SheetsProxyError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(SheetsErrorBody {
                success: false,
                error: self.error,
                message: CONNECT_FAILURE_MESSAGE,
            }),
        )
            .into_response()
    }
}

fn sheets_client(state: &AppState) -> Result<Arc<SheetsClient>, SheetsProxyError> {
    state
        .sheets
        .clone()
        .ok_or_else(|| SheetsProxyError::internal("sheets endpoint is not configured"))
}

async fn fetch_products(state: &AppState, req_id: &RequestId) -> Result<Response, SheetsProxyError> {
    let client = sheets_client(state)?;
    let envelope = client.fetch_products().await.map_err(|e| {
        tracing::error!(request_id = %req_id.0, error = %e, "sheet fetch failed");
        SheetsProxyError::internal(e.to_string())
    })?;
    Ok(Json(envelope).into_response())
}

pub(super) async fn sheets_proxy_get(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Response, SheetsProxyError> {
    fetch_products(&state, &req_id).await
}

/// `{method: "GET"}` or a missing action fetches the product sheet; any
/// other action is forwarded and its answer returned unchanged.
pub(super) async fn sheets_proxy(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<SheetsProxyRequest>, JsonRejection>,
) -> Result<Response, SheetsProxyError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => SheetsProxyRequest::default(),
        Err(rejection) => return Err(SheetsProxyError::bad_request(rejection.body_text())),
    };

    let action = match request.action {
        Some(action) if request.method.as_deref() != Some("GET") => action,
        _ => return fetch_products(&state, &req_id).await,
    };

    let Some(action) = SheetsAction::from_name(&action) else {
        return Err(SheetsProxyError::bad_request(format!(
            "unknown sheet action: {action}"
        )));
    };

    let client = sheets_client(&state)?;
    let body = client.run_action(action).await.map_err(|e| {
        tracing::error!(
            request_id = %req_id.0,
            action = action.as_str(),
            error = %e,
            "sheet action failed"
        );
        SheetsProxyError::internal(e.to_string())
    })?;
    Ok(Json(body).into_response())
}
