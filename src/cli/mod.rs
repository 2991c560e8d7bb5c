//! CLI interface for DevSync Auth

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "devsync-auth")]
#[command(version)]
#[command(about = "Credential authentication and session tokens for DevSync", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a devsync.toml with a freshly generated signing secret
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Config file (defaults to the nearest devsync.toml)
        #[arg(short, long, env = "DEVSYNC_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Print a bcrypt hash for a seed user's password_hash.
    /// The password is prompted for on a terminal, otherwise read from stdin.
    HashPassword {
        /// bcrypt work factor
        #[arg(long, default_value = "12")]
        cost: u32,
    },

    /// Verify a session token and print its claims
    DecodeToken {
        token: String,

        /// Config file holding the signing secret
        #[arg(short, long, env = "DEVSYNC_CONFIG")]
        config: Option<PathBuf>,
    },
}
