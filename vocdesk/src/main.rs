//! vocdesk - Turn customer complaints (VOC) into tracker tickets.
//!
//! Describe a complaint in plain language, review the ticket template the
//! backend proposes, edit it, and confirm it to create the ticket.
//!
//! Architecture:
//! - CLI is a thin client; AI inference and ticket creation happen in the backend
//! - The conversation store owns the session id, message log and pending template
//! - All backend access goes through the `Backend` trait

mod admin;
mod api;
mod cli;
mod config;
mod models;
mod render;
mod store;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    execute(cli).await
}
