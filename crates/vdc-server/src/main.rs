mod api;
mod middleware;

use tracing_subscriber::EnvFilter;
use vdc_catalog::{ClientOptions, GraphqlClient, SheetsClient};

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = vdc_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let options = ClientOptions::from_app_config(&config);
    let graphql = GraphqlClient::new(&config.graphql_endpoint, &options)?;
    let sheets = match config.sheets_endpoint.as_deref() {
        Some(endpoint) => Some(SheetsClient::new(endpoint, &options)?),
        None => {
            tracing::warn!("VDC_SHEETS_ENDPOINT not set; sheets proxy will report errors");
            None
        }
    };

    let app = build_app(AppState::new(graphql, sheets));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        env = %config.env,
        addr = %config.bind_addr,
        graphql_endpoint = %config.graphql_endpoint,
        "vdc-server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
