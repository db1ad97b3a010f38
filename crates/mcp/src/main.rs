//! Opine MCP Server Binary
//!
//! ## Usage
//!
//! ```bash
//! # Minimal
//! OPINE_API_KEY=opk_live_... opine-mcp
//!
//! # Against a staging API, with JSON logs
//! OPINE_API_KEY=... OPINE_BASE_URL=https://staging.tryopine.com/v1 OPINE_LOG_FORMAT=json opine-mcp
//! ```
//!
//! Logs go to stderr. Stdout carries the MCP protocol.

use std::process::ExitCode;

use anyhow::Result;
use opine_client::OpineClient;
use opine_core::config::{AppConfig, LoadOptions, LogFormat};
use opine_mcp::OpineMcpServer;
use tracing::{info, Level};

fn log_level(config: &AppConfig) -> Level {
    config.logging.level.parse::<Level>().unwrap_or(Level::INFO)
}

fn init_logging(config: &AppConfig) {
    let level = log_level(config);
    let builder =
        tracing_subscriber::fmt().with_target(false).with_max_level(level).with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Error: {error}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %format!("{error:#}"), "opine-mcp exited with error");
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<()> {
    let client = OpineClient::from_config(&config.api)?;
    info!(base_url = client.base_url(), "Starting Opine MCP Server");

    OpineMcpServer::new(client).run_stdio().await
}
