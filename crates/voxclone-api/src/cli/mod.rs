//! CLI command definitions for the `voxclone` binary.
//!
//! Uses clap derive macros. Every command takes the user id issued by the
//! surrounding application as its first positional argument.

pub mod credential;
pub mod status;
pub mod sync;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Clone versioned voice-assistant templates into user platform accounts.
#[derive(Parser)]
#[command(name = "voxclone", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export spans to stdout through OpenTelemetry.
    #[arg(long, global = true, env = "VOXCLONE_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store (or replace) a user's platform API key.
    Link {
        /// User identifier.
        user: String,

        /// Platform API key (prompted for when omitted).
        #[arg(long)]
        api_key: Option<String>,

        /// Optional web token for live sessions.
        #[arg(long)]
        web_token: Option<String>,
    },

    /// Forget a user's stored credentials.
    Unlink {
        /// User identifier.
        user: String,
    },

    /// Clone or upgrade the templates in a user's account.
    Sync {
        /// User identifier.
        user: String,
    },

    /// Show what is stored for a user.
    Status {
        /// User identifier.
        user: String,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
