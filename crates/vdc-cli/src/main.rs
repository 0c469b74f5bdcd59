mod catalog;
mod sheets;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::sheets::SheetsCommands;

#[derive(Debug, Parser)]
#[command(name = "vdc-cli")]
#[command(about = "Villa de Cortes catalog aggregation and reporting")]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a full batch aggregation across every category
    Aggregate,
    /// List categories with their advertised product counts
    Categories,
    /// Compute dashboard KPIs over the aggregated catalog
    Kpis {
        /// Where to read products from
        #[arg(long, value_enum, default_value_t = KpiSource::Graphql)]
        source: KpiSource,
    },
    /// Spreadsheet catalog source commands
    Sheets {
        #[command(subcommand)]
        command: SheetsCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KpiSource {
    Graphql,
    Sheets,
}

/// Writes `value` to stdout as JSON. Logs go to stderr so stdout stays
/// machine-readable.
pub(crate) fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = vdc_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Aggregate => catalog::run_aggregate(&config, cli.pretty).await,
        Commands::Categories => catalog::run_categories(&config, cli.pretty).await,
        Commands::Kpis { source } => catalog::run_kpis(&config, source, cli.pretty).await,
        Commands::Sheets { command } => sheets::run(&config, &command, cli.pretty).await,
    }
}
