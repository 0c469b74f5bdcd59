use thiserror::Error;

use crate::sheets::SheetsParseError;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream kept answering 429/503 until retries ran out.
    #[error("transient upstream failure: HTTP {status} after retries: {body}")]
    TransientStatus { status: u16, body: String },

    /// Non-retriable, non-2xx status.
    #[error("unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Upstream returned a well-formed error payload.
    #[error("upstream application error: {0}")]
    Application(String),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("normalization error for product {sku}: {reason}")]
    Normalization { sku: String, reason: String },

    /// Categories could not be listed, so there is nothing to aggregate.
    #[error("category enumeration failed: {0}")]
    Enumeration(#[source] Box<CatalogError>),

    #[error(transparent)]
    SheetsPayload(#[from] SheetsParseError),

    #[error("invalid endpoint \"{endpoint}\": {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

impl CatalogError {
    /// Returns `true` for failures caused by transport or upstream load
    /// rather than by the request itself.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            CatalogError::Http(_) | CatalogError::TransientStatus { .. } => true,
            CatalogError::Enumeration(inner) => inner.is_transient(),
            _ => false,
        }
    }
}
