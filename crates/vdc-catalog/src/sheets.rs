//! Client for the spreadsheet-backed catalog source.
//!
//! `GET` returns the product sheet, either as a bare JSON array or wrapped in
//! a `{success, data, message}` envelope. `POST {action}` triggers the sheet's
//! maintenance commands.

use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use vdc_core::{ProductRecord, SheetProduct, SheetsEnvelope, UpdateState, UpdateStatus};

use crate::client::{ClientOptions, HttpClient};
use crate::error::CatalogError;
use crate::normalize::normalize_sheet_row;

/// Why a product-sheet payload could not be read.
#[derive(Debug, Error)]
pub enum SheetsParseError {
    #[error("sheet payload is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("sheet payload has an unexpected shape: {0}")]
    UnexpectedShape(String),
}

/// Commands accepted by the sheet's `POST` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetsAction {
    RunManualUpdate,
    EnableAutoUpdate,
    DisableAutoUpdate,
    GetUpdateStatus,
}

impl SheetsAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SheetsAction::RunManualUpdate => "run_manual_update",
            SheetsAction::EnableAutoUpdate => "enable_auto_update",
            SheetsAction::DisableAutoUpdate => "disable_auto_update",
            SheetsAction::GetUpdateStatus => "get_update_status",
        }
    }

    /// Parses the wire name of an action.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "run_manual_update" => Some(SheetsAction::RunManualUpdate),
            "enable_auto_update" => Some(SheetsAction::EnableAutoUpdate),
            "disable_auto_update" => Some(SheetsAction::DisableAutoUpdate),
            "get_update_status" => Some(SheetsAction::GetUpdateStatus),
            _ => None,
        }
    }
}

/// Parses a raw product-sheet body into the envelope form.
///
/// # Errors
///
/// Returns [`SheetsParseError`] if the body is not JSON or has neither the
/// array nor the envelope shape.
pub fn parse_products_payload(raw: &str) -> Result<SheetsEnvelope, SheetsParseError> {
    let value: Value = serde_json::from_str(raw).map_err(SheetsParseError::InvalidJson)?;
    parse_products_value(value)
}

/// Normalizes an already-parsed product-sheet body into the envelope form.
///
/// A bare array becomes `{success: true, data}`. An object must carry a
/// boolean `success`; `data` may be absent when `success` is false.
///
/// # Errors
///
/// Returns [`SheetsParseError`] on any other shape. Malformed rows are
/// dropped, not fatal.
pub fn parse_products_value(value: Value) -> Result<SheetsEnvelope, SheetsParseError> {
    match value {
        Value::Array(rows) => Ok(SheetsEnvelope {
            success: true,
            data: parse_rows(rows),
            message: None,
        }),
        Value::Object(mut map) => {
            let success = map
                .get("success")
                .and_then(Value::as_bool)
                .ok_or_else(|| {
                    SheetsParseError::UnexpectedShape("object without boolean `success`".into())
                })?;
            let message = map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned);
            let data = match map.remove("data") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(rows)) => parse_rows(rows),
                Some(other) => {
                    return Err(SheetsParseError::UnexpectedShape(format!(
                        "`data` is {} instead of an array",
                        json_kind(&other)
                    )))
                }
            };
            Ok(SheetsEnvelope {
                success,
                data,
                message,
            })
        }
        other => Err(SheetsParseError::UnexpectedShape(format!(
            "top-level {} instead of array or object",
            json_kind(&other)
        ))),
    }
}

/// Rows that cannot be read are logged and dropped so one bad line does not
/// hide the rest of the sheet.
fn parse_rows(rows: Vec<Value>) -> Vec<SheetProduct> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(product) => Some(product),
            Err(e) => {
                tracing::warn!(row = index, error = %e, "dropping unreadable sheet row");
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Wire shape of `get_update_status`; progress may arrive as a float or out
/// of range and is clamped.
#[derive(Debug, Deserialize)]
struct RawUpdateStatus {
    status: UpdateState,
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    report: Option<String>,
}

impl From<RawUpdateStatus> for UpdateStatus {
    fn from(raw: RawUpdateStatus) -> Self {
        let progress = raw.progress.filter(|p| p.is_finite()).unwrap_or(0.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let progress = progress.round().clamp(0.0, 100.0) as u8;
        Self {
            status: raw.status,
            progress,
            message: raw.message.unwrap_or_default(),
            report: raw.report.filter(|r| !r.is_empty()),
        }
    }
}

pub struct SheetsClient {
    http: HttpClient,
    endpoint: Url,
}

impl SheetsClient {
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
        })
    }

    /// Fetches the product sheet and returns it in envelope form.
    ///
    /// # Errors
    ///
    /// Propagates request errors; returns [`CatalogError::SheetsPayload`] if
    /// the body has neither accepted shape.
    pub async fn fetch_products(&self) -> Result<SheetsEnvelope, CatalogError> {
        let body = self.http.get_json(&self.endpoint).await?;
        let envelope = parse_products_value(body)?;
        tracing::info!(
            success = envelope.success,
            rows = envelope.data.len(),
            "fetched product sheet"
        );
        Ok(envelope)
    }

    /// Fetches the product sheet and normalizes every valid row.
    ///
    /// Rows that fail normalization are logged and dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Application`] with the sheet's message when
    /// the envelope reports `success: false`, plus any
    /// [`Self::fetch_products`] error.
    pub async fn fetch_records(&self) -> Result<Vec<ProductRecord>, CatalogError> {
        let envelope = self.fetch_products().await?;
        if !envelope.success {
            return Err(CatalogError::Application(
                envelope
                    .message
                    .unwrap_or_else(|| "Error fetching products".to_owned()),
            ));
        }

        let records = envelope
            .data
            .into_iter()
            .filter_map(|row| match normalize_sheet_row(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(error = %e, "dropping sheet row");
                    None
                }
            })
            .collect();
        Ok(records)
    }

    /// Posts `{action}` and returns the sheet's JSON answer as-is.
    ///
    /// # Errors
    ///
    /// Propagates request errors; returns [`CatalogError::Application`] if
    /// the answer is not an object.
    pub async fn run_action(&self, action: SheetsAction) -> Result<Value, CatalogError> {
        tracing::info!(action = action.as_str(), "sending sheet action");
        let body = self
            .http
            .post_json(&self.endpoint, &json!({ "action": action.as_str() }))
            .await?;
        if !body.is_object() {
            return Err(CatalogError::Application(format!(
                "sheet action {} returned {}",
                action.as_str(),
                json_kind(&body)
            )));
        }
        Ok(body)
    }

    /// Asks the sheet for the state of its refresh job.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::run_action`] errors; returns
    /// [`CatalogError::Deserialize`] if the status has an unknown shape.
    pub async fn update_status(&self) -> Result<UpdateStatus, CatalogError> {
        let body = self.run_action(SheetsAction::GetUpdateStatus).await?;
        let raw: RawUpdateStatus =
            serde_json::from_value(body).map_err(|e| CatalogError::Deserialize {
                context: "get_update_status".to_owned(),
                source: e,
            })?;
        Ok(raw.into())
    }
}
