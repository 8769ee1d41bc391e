//! `works-mcp`: serve the Works tool surface as an MCP server over stdio.
//!
//! stdout carries the protocol, so all logging goes to stderr.

mod server;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use rmcp::ServiceExt as _;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use works_tools::{DEFAULT_BASE_URL, TOKEN_ENV, WorksApiConfig, WorksToolSource};

use crate::server::WorksMcpServer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "works-mcp", version, about)]
struct Cli {
    /// Bearer token for the Works API.
    #[arg(long, env = TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,

    /// Works API base URL.
    #[arg(long, env = "WORKS_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Log filter (`RUST_LOG` wins when set).
    #[arg(long, env = "WORKS_MCP_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[arg(long, env = "WORKS_MCP_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format);

    let config = WorksApiConfig::new(&cli.base_url, cli.token.unwrap_or_default())
        .context("invalid Works API configuration")?;
    let source = WorksToolSource::new(config).context("build Works API client")?;

    info!(
        base_url = %source.client().config().base_url(),
        tools = source.list_tools().len(),
        "serving Works tools over stdio"
    );

    let service = WorksMcpServer::new(source)
        .serve(rmcp::transport::stdio())
        .await
        .context("start MCP session")?;
    let reason = service.waiting().await.context("MCP session failed")?;
    info!(?reason, "MCP session closed");
    Ok(())
}

fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
