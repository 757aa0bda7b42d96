//! Gemini Image MCP Server
//!
//! MCP server for image generation and transformation using Google's Gemini model.

use anyhow::{Context, Result};
use clap::Parser;
use gemini_image_mcp::ImageServer;
use gemini_image_mcp_common::tracing::init_tracing;
use gemini_image_mcp_common::{Config, McpServerBuilder, TransportArgs};

/// Command-line arguments for the image server.
#[derive(Parser, Debug)]
#[command(name = "gemini-image-mcp")]
#[command(about = "MCP server for image generation using Google's Gemini model")]
struct Args {
    /// Transport configuration
    #[command(flatten)]
    transport: TransportArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    let config = Config::from_env()?;
    tracing::info!(
        image_model = %config.image_model,
        text_model = %config.text_model,
        output_dir = %config.output_dir.display(),
        upload = config.upload_enabled(),
        "Configuration loaded"
    );

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| {
            format!("Failed to create output directory {}", config.output_dir.display())
        })?;

    let server = ImageServer::new(&config);

    McpServerBuilder::new(server)
        .with_transport(args.transport.into_transport())
        .run()
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
