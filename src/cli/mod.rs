//! Command-line surface: run the HTTP service, run one lookup, or probe upstreams.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::config::Settings;
use crate::entities::lookup::DrugInfoService;

pub mod health;

#[derive(Parser, Debug)]
#[command(
    name = "druginfo",
    version,
    about = "Plain-language drug information from RxNorm, OpenFDA and Pillbox"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve `POST /drug-info` over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 5000)]
        port: u16,
    },
    /// Look up one drug and print its report
    Get {
        /// Drug name, matched exactly as typed
        name: String,
        /// Print the HTTP-shaped JSON body instead of the report text
        #[arg(long)]
        json: bool,
    },
    /// Check connectivity to the configured upstream APIs
    Health,
}

fn build_service() -> anyhow::Result<DrugInfoService> {
    let settings = Settings::from_env()?;
    Ok(DrugInfoService::from_settings(&settings)?)
}

/// Runs the HTTP server with settings from the environment.
///
/// # Errors
///
/// Returns an error when configuration is invalid or the server cannot start.
pub async fn serve(host: &str, port: u16) -> anyhow::Result<()> {
    let service = build_service()?;
    crate::server::run(host, port, Arc::new(service)).await
}

/// Executes a command and returns the text to print; `serve` returns nothing
/// once the server shuts down.
///
/// # Errors
///
/// Returns an error when the drug is not found, an upstream probe is
/// unhealthy, or configuration is invalid.
pub async fn run(cli: Cli) -> anyhow::Result<String> {
    match cli.command {
        Commands::Serve { host, port } => {
            serve(&host, port).await?;
            Ok(String::new())
        }
        Commands::Get { name, json } => {
            let service = build_service()?;
            let outcome = service.lookup(&name).await;
            let report = crate::server::outcome_to_result(&name, outcome)?;
            if json {
                Ok(crate::render::json::to_pretty(&report)?)
            } else {
                Ok(report.response)
            }
        }
        Commands::Health => {
            let settings = Settings::from_env()?;
            let report = health::check(&settings).await?;
            if report.all_healthy() {
                Ok(report.to_markdown())
            } else {
                Err(anyhow::anyhow!(report.to_markdown()))
            }
        }
    }
}
