//! CLI argument definitions.

use clap::{Parser, Subcommand};

/// vocdesk - Turn customer complaints into tracker tickets
#[derive(Parser, Debug)]
#[command(name = "vocdesk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides VOC_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Request timeout in seconds (overrides VOC_API_TIMEOUT_SECS)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Subcommand to execute (defaults to `chat`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Send one message and print the answer
    Send {
        /// Override a proposed field before confirming (FIELD=VALUE, `\n` for a line break)
        #[arg(long = "set", value_name = "FIELD=VALUE", requires = "confirm")]
        overrides: Vec<String>,

        /// Create the ticket if a template is proposed
        #[arg(long)]
        confirm: bool,

        /// Message to send
        #[arg(trailing_var_arg = true, required = true)]
        message: Vec<String>,
    },

    /// List the ticket templates the backend knows
    Templates,

    /// Read or change backend settings
    Admin {
        /// Admin password (overrides VOC_ADMIN_PASSWORD)
        #[arg(long)]
        password: Option<String>,

        #[command(subcommand)]
        action: AdminAction,
    },
}

/// Settings panel actions
#[derive(Subcommand, Debug)]
pub enum AdminAction {
    /// Check the admin password
    Verify,

    /// Show current settings
    Show,

    /// Change settings (FIELD=VALUE, e.g. jira-project-key=VOC)
    Set {
        #[arg(required = true, value_name = "FIELD=VALUE")]
        assignments: Vec<String>,
    },
}

/// Split `FIELD=VALUE` at the first `=`.
pub fn split_assignment(raw: &str) -> Option<(&str, &str)> {
    let (field, value) = raw.split_once('=')?;
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    Some((field, value))
}
