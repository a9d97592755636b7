//! Command-line interface parsing and startup.
//!
//! Resolves configuration, checks the API credential, wires diagnostics, and
//! hands off to the interactive chat loop.

use std::error::Error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::core::config::{Config, RuntimeSettings};
use crate::ui::chat_loop::run_chat;

#[derive(Parser)]
#[command(name = "arix")]
#[command(about = "A terminal concierge that drives a decorative holiday scene through conversation")]
#[command(
    long_about = "Arix is a full-screen terminal concierge for a decorative holiday scene. \
Conversation with the concierge drives the scene: keywords in your messages assemble or \
scatter the signature tree, and every reply rerolls its glow and spin.\n\n\
Environment Variables:\n\
  ARIX_API_KEY      Your API key (required; OPENAI_API_KEY also accepted)\n\
  ARIX_BASE_URL     Custom API base URL (optional, defaults to https://api.openai.com/v1)\n\
  ARIX_TRACE_FILE   Write diagnostic traces to this file (optional)\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message\n\
  Ctrl+T            Toggle the tree between its shape and the scattered cloud\n\
  Ctrl+L            Pause/resume transcript logging\n\
  Up/Down/Mouse     Scroll through chat history\n\
  Ctrl+C            Quit the application"
)]
pub struct Args {
    /// Model to use for the concierge
    #[arg(short = 'm', long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Enable transcript logging to the specified file
    #[arg(short = 'l', long, value_name = "FILE")]
    pub log: Option<String>,

    /// Override the API base URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    init_tracing()?;

    let config = Config::load()?;
    let settings = RuntimeSettings::resolve(&config, args.model, args.base_url, args.log)?;

    run_chat(settings).await
}

/// Diagnostics go to a file, never stderr: the TUI owns the terminal.
fn init_tracing() -> Result<(), Box<dyn Error>> {
    let Ok(trace_path) = std::env::var("ARIX_TRACE_FILE") else {
        return Ok(());
    };

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&trace_path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("arix=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
