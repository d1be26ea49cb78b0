use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use blazegate::{gateway, logging, AppState, Config};

/// REST gateway for Blazegraph namespace management and Turtle uploads.
#[derive(Debug, Parser)]
#[command(name = "blazegate", version, about)]
struct Cli {
    /// Config file (defaults to the per-user config.toml if present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listen address, overrides `server.host`
    #[arg(long)]
    host: Option<String>,

    /// Listen port, overrides `server.port`
    #[arg(short, long)]
    port: Option<u16>,

    /// Blazegraph base URL, overrides `blazegraph.url`
    #[arg(long, value_name = "URL")]
    blazegraph_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(url) = cli.blazegraph_url {
        config.blazegraph.url = url;
    }
    config.validate()?;

    logging::init(&config.logging);
    tracing::info!(
        blazegraph = %config.blazegraph.url,
        ingest = %config.ingest.url,
        "Starting blazegate"
    );

    let state = AppState::from_config(&config)?;
    gateway::serve(&config, state).await
}
