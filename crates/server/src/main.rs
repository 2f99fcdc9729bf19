use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod api;
mod config;

use config::{AppState, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "xentral-mcp-server")]
#[command(about = "MCP HTTP server exposing the Xentral ERP API as tools", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "xmcp.toml")]
    config: PathBuf,

    /// Host to bind to
    #[arg(long, env = "MCP_SERVER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "MCP_SERVER_PORT", default_value = "8888")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xentral_mcp=info,tower_http=info".into()),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    tracing::info!("Starting Xentral MCP server");

    // Load configuration
    let config = ServerConfig::load(&args.config)?;

    for problem in config.xentral.validate() {
        tracing::warn!("{problem}");
    }
    if !config.xentral.is_configured() {
        tracing::warn!("credentials can be updated at runtime via POST /config/credentials");
    }

    let state = AppState::new(config.xentral);
    tracing::info!(
        tools = state.dispatcher.registry().current().len(),
        "tool registry loaded"
    );

    // Start API server
    let addr = format!("{}:{}", args.host, args.port);
    tracing::info!("Starting MCP server on {}", addr);

    api::serve(&addr, state).await?;

    Ok(())
}
