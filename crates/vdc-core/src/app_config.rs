use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// GraphQL storefront endpoint every catalog query is posted to.
    pub graphql_endpoint: String,
    /// Apps Script web-app URL backing the spreadsheet source. Only the
    /// Sheets commands need it, so it stays optional.
    pub sheets_endpoint: Option<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Products requested per category page.
    pub page_size: u32,
    /// Courtesy delay between sequential upstream calls.
    pub inter_request_delay_ms: u64,
    /// Retries after the first attempt for 429/503 and network failures.
    pub max_retries: u32,
    /// Base delay for exponential backoff: `retry_backoff_base_ms * 2^attempt`.
    pub retry_backoff_base_ms: u64,
}
