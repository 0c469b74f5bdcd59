use thiserror::Error;

use crate::app_config::{AppConfig, Environment};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

impl AppConfig {
    /// The spreadsheet endpoint, for commands that cannot run without it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] naming `VDC_SHEETS_ENDPOINT`
    /// when it is not set.
    pub fn require_sheets_endpoint(&self) -> Result<&str, ConfigError> {
        self.sheets_endpoint
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("VDC_SHEETS_ENDPOINT".to_string()))
    }
}

const DEFAULT_GRAPHQL_ENDPOINT: &str = "https://tiendaddvc.mx/graphql";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("VDC_ENV", "development"))?;

    let bind_addr = or_default("VDC_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("VDC_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("VDC_LOG_LEVEL", "info");

    let graphql_endpoint = or_default("VDC_GRAPHQL_ENDPOINT", DEFAULT_GRAPHQL_ENDPOINT);
    if !graphql_endpoint.starts_with("http://") && !graphql_endpoint.starts_with("https://") {
        return Err(invalid(
            "VDC_GRAPHQL_ENDPOINT",
            format!("\"{graphql_endpoint}\" is not an http(s) URL"),
        ));
    }
    let sheets_endpoint = lookup("VDC_SHEETS_ENDPOINT")
        .ok()
        .filter(|s| !s.trim().is_empty());

    let request_timeout_secs = parse_u64("VDC_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("VDC_USER_AGENT", "vdc-dashboard/0.1");

    let page_size = parse_u32("VDC_PAGE_SIZE", "100")?;
    if page_size == 0 {
        return Err(invalid("VDC_PAGE_SIZE", "must be at least 1".to_string()));
    }
    let inter_request_delay_ms = parse_u64("VDC_INTER_REQUEST_DELAY_MS", "100")?;
    let max_retries = parse_u32("VDC_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("VDC_RETRY_BACKOFF_BASE_MS", "1000")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        graphql_endpoint,
        sheets_endpoint,
        request_timeout_secs,
        user_agent,
        page_size,
        inter_request_delay_ms,
        max_retries,
        retry_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "VDC_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
