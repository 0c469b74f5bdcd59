//! Spreadsheet source command handlers.

use clap::Subcommand;
use vdc_catalog::{ClientOptions, SheetsAction, SheetsClient};
use vdc_core::AppConfig;

use crate::print_json;

/// Sub-commands available under `sheets`.
#[derive(Debug, Subcommand)]
pub enum SheetsCommands {
    /// Fetch the product sheet
    Products,
    /// Start a manual refresh of the sheet
    ManualUpdate,
    /// Turn on the sheet's scheduled refresh
    EnableAuto,
    /// Turn off the sheet's scheduled refresh
    DisableAuto,
    /// Show progress of the current or last refresh
    Status,
}

impl SheetsCommands {
    /// The sheet action this command sends, or `None` for a product fetch.
    pub(crate) fn action(&self) -> Option<SheetsAction> {
        match self {
            SheetsCommands::Products => None,
            SheetsCommands::ManualUpdate => Some(SheetsAction::RunManualUpdate),
            SheetsCommands::EnableAuto => Some(SheetsAction::EnableAutoUpdate),
            SheetsCommands::DisableAuto => Some(SheetsAction::DisableAutoUpdate),
            SheetsCommands::Status => Some(SheetsAction::GetUpdateStatus),
        }
    }
}

pub(crate) fn build_sheets_client(config: &AppConfig) -> anyhow::Result<SheetsClient> {
    let endpoint = config.require_sheets_endpoint()?;
    Ok(SheetsClient::new(
        endpoint,
        &ClientOptions::from_app_config(config),
    )?)
}

pub(crate) async fn run(
    config: &AppConfig,
    command: &SheetsCommands,
    pretty: bool,
) -> anyhow::Result<()> {
    let client = build_sheets_client(config)?;

    match command.action() {
        None => print_json(&client.fetch_products().await?, pretty),
        Some(SheetsAction::GetUpdateStatus) => print_json(&client.update_status().await?, pretty),
        Some(action) => print_json(&client.run_action(action).await?, pretty),
    }
}
