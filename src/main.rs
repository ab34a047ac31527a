//! Triage CLI
//!
//! `triage serve` runs the HTTP service; `triage diagnose` runs the full
//! workflow for one error in-process and prints the result as JSON.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use triage_api::{ApiConfig, ApiServer, DiagnoseRequest, WorkflowResponse};
use triage_core::config::LoggingConfig;
use triage_core::error_source::ErrorQuery;
use triage_core::{TriageConfig, TriagePipeline};

#[derive(Debug, Parser)]
#[command(name = "triage", version, about = "Production error triage")]
struct Cli {
    /// TOML configuration file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Diagnose one error and print the proposed solution
    #[command(group(ArgGroup::new("target").required(true).args(["transaction_id", "scope_id"])))]
    Diagnose {
        #[arg(long)]
        transaction_id: Option<String>,
        #[arg(long)]
        scope_id: Option<String>,
        /// Window for scope lookups, e.g. 30m, 24h, 7d
        #[arg(long)]
        time_range: Option<String>,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = TriageConfig::load(cli.config.as_deref())
        .context("failed to load triage configuration")?;
    init_tracing(&config.logging);

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let pipeline = TriagePipeline::from_config(&config);
            let server = ApiServer::new(ApiConfig::from(&config.server), pipeline);
            server.start().await
        }
        Command::Diagnose {
            transaction_id,
            scope_id,
            time_range,
        } => {
            let request = DiagnoseRequest {
                transaction_id,
                scope_id,
                time_range,
            };
            let pipeline = TriagePipeline::from_config(&config);

            let Some(outcome) = pipeline.run(&ErrorQuery::from(request.clone())).await else {
                bail!("No error found for the given criteria");
            };
            info!(
                "{} -> {}",
                outcome.diagnostic.category(),
                outcome.solution.decision()
            );

            let response = WorkflowResponse::new(&request, outcome);
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
    }
}
