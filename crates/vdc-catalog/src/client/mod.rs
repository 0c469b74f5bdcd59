//! Retrying JSON-over-HTTP client shared by the GraphQL and Sheets sources.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;

use crate::error::CatalogError;
use crate::retry::{retry_with_backoff, RetryPolicy};

/// Maximum number of response-body characters carried in an error.
pub(crate) const MAX_ERROR_BODY_CHARS: usize = 200;

/// Construction-time settings for the upstream clients.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub retry: RetryPolicy,
    /// Products requested per category page.
    pub page_size: u32,
    /// Courtesy delay between sequential upstream calls.
    pub inter_request_delay: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "vdc-dashboard/0.1".to_owned(),
            retry: RetryPolicy::default(),
            page_size: 100,
            inter_request_delay: Duration::from_millis(100),
        }
    }
}

impl ClientOptions {
    #[must_use]
    pub fn from_app_config(config: &vdc_core::AppConfig) -> Self {
        Self {
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                backoff_base_ms: config.retry_backoff_base_ms,
            },
            page_size: config.page_size,
            inter_request_delay: Duration::from_millis(config.inter_request_delay_ms),
        }
    }
}

/// Sends one JSON request at a time and decides success, failure, or retry.
///
/// - 2xx with a JSON body and no top-level `errors` array: success.
/// - 429 / 503 and network failures: retried per the [`RetryPolicy`].
/// - any other status, an `errors` array, or a non-JSON body: immediate failure.
pub struct HttpClient {
    client: Client,
    retry: RetryPolicy,
}

impl HttpClient {
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(options: &ClientOptions) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(options.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            retry: options.retry,
        })
    }

    /// POSTs `payload` as JSON and returns the parsed response body.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::TransientStatus`] if 429/503 persisted through every retry.
    /// - [`CatalogError::Http`] on network failure after every retry.
    /// - [`CatalogError::UnexpectedStatus`] on any other non-2xx (not retried).
    /// - [`CatalogError::Application`] if the body carries an `errors` array.
    /// - [`CatalogError::Deserialize`] if the body is not JSON.
    pub async fn post_json(&self, url: &Url, payload: &Value) -> Result<Value, CatalogError> {
        self.send(&Method::POST, url, Some(payload)).await
    }

    /// GETs `url` and returns the parsed response body.
    ///
    /// # Errors
    ///
    /// Same as [`Self::post_json`].
    pub async fn get_json(&self, url: &Url) -> Result<Value, CatalogError> {
        self.send(&Method::GET, url, None).await
    }

    async fn send(
        &self,
        method: &Method,
        url: &Url,
        payload: Option<&Value>,
    ) -> Result<Value, CatalogError> {
        retry_with_backoff(self.retry, move |attempt| async move {
            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .header(reqwest::header::ACCEPT, "application/json");
            if let Some(body) = payload {
                request = request.json(body);
            }

            let response = request.send().await?;
            let status = response.status();
            tracing::debug!(
                attempt,
                status = status.as_u16(),
                url = %url,
                "upstream responded"
            );

            let body = response.text().await?;
            classify_response(status, &body, url)
        })
        .await
    }
}

/// Turns a status and raw body into the parsed JSON or a typed error.
pub(crate) fn classify_response(
    status: StatusCode,
    body: &str,
    url: &Url,
) -> Result<Value, CatalogError> {
    if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE {
        return Err(CatalogError::TransientStatus {
            status: status.as_u16(),
            body: truncate_body(body),
        });
    }

    if !status.is_success() {
        return Err(CatalogError::UnexpectedStatus {
            status: status.as_u16(),
            body: truncate_body(body),
        });
    }

    let value: Value = serde_json::from_str(body).map_err(|e| CatalogError::Deserialize {
        context: format!("response body from {url}"),
        source: e,
    })?;

    if let Some(message) = application_error(&value) {
        return Err(CatalogError::Application(message));
    }

    Ok(value)
}

/// Returns the first error message when the body carries a top-level
/// `errors` array. An empty array still counts as an error.
pub(crate) fn application_error(value: &Value) -> Option<String> {
    let errors = value.get("errors")?.as_array()?;
    let message = errors
        .first()
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("GraphQL query error");
    Some(message.to_owned())
}

/// Caps `body` at [`MAX_ERROR_BODY_CHARS`] characters, marking the cut with `…`.
pub(crate) fn truncate_body(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(MAX_ERROR_BODY_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
