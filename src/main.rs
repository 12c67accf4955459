//! `interactive-feedback-mcp` - MCP stdio server exposing `interactive_feedback`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use interactive_feedback::config;
use interactive_feedback::executor::DialogLauncher;
use interactive_feedback::logging::{self, LogTarget};
use interactive_feedback::mcp_server::McpServer;

#[derive(Debug, Parser)]
#[command(name = "interactive-feedback-mcp", version, about)]
struct Cli {
    /// Font size for the feedback dialog (overrides config)
    #[arg(long)]
    font_size: Option<u32>,

    /// Alternative config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the feedback-ui executable (overrides config)
    #[arg(long)]
    dialog: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(LogTarget::Bridge);

    let loaded_config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    };

    let launcher = DialogLauncher::from_config(&loaded_config, cli.dialog, cli.font_size);
    info!(
        dialog = %launcher.program().display(),
        font_size = launcher.font_size(),
        "Interactive feedback MCP server starting"
    );

    McpServer::new(launcher)
        .run_stdio()
        .context("MCP stdio transport failed")?;

    info!("stdin closed, shutting down");
    Ok(())
}
