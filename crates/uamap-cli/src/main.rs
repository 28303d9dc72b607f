mod commands;
mod progress;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "uamap")]
#[command(about = "Plot delivery coverage of Ukrainian cities on an interactive map")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interactive session: upload a spreadsheet, process it, save the results (default)
    Shell,
    /// Upload, process and optionally save a spreadsheet in one go
    Process {
        /// Spreadsheet with Area, City and Доставка columns
        input: PathBuf,

        /// Move the generated map here when the run succeeds
        #[arg(long)]
        map_out: Option<PathBuf>,

        /// Move the missing-coordinates file here (requires --map-out)
        #[arg(long, requires = "map_out")]
        missing_out: Option<PathBuf>,
    },
    /// Geocode a single city/region pair and print the result
    Geocode { city: String, region: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = uamap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?config, "configuration loaded");

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => shell::run(&config).await,
        Commands::Process {
            input,
            map_out,
            missing_out,
        } => {
            commands::process_once(&config, &input, map_out.as_deref(), missing_out.as_deref())
                .await
        }
        Commands::Geocode { city, region } => commands::geocode_once(&config, &city, &region).await,
    }
}

#[cfg(test)]
mod tests;
