//! CLI command implementations

use anyhow::{bail, Result};
use dialoguer::{theme::ColorfulTheme, Password};
use std::fs;
use std::io::{self, BufRead, IsTerminal};
use std::path::{Path, PathBuf};

use crate::auth::{BcryptHasher, PasswordHasher, TokenSigner};
use crate::cli::{error, info, print_claims, success, warn};
use crate::config::{self, Config};

/// Write a new devsync.toml configuration file
pub async fn init(force: bool) -> Result<()> {
    let config_path = Path::new(config::loader::CONFIG_FILENAME);

    if config_path.exists() && !force {
        warn("devsync.toml already exists (use --force to overwrite)");
        return Ok(());
    }

    let secret = config::loader::generate_secret();
    fs::write(config_path, config::loader::default_config_content(&secret))?;

    success("Created devsync.toml");
    info("Run 'devsync-auth serve' to start the API");

    Ok(())
}

/// Start the HTTP API server
pub async fn serve(host: Option<String>, port: Option<u16>, config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info(&format!("Starting API server on {}:{}", host, port));
    crate::api::run_server(config, &host, port).await?;
    Ok(())
}

/// Print a bcrypt hash of a password read from the terminal or stdin
pub async fn hash_password(cost: u32) -> Result<()> {
    let password = if io::stdin().is_terminal() {
        Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?
    } else {
        read_password(io::stdin().lock())?
    };

    let hasher = BcryptHasher::new(cost);
    let hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;
    println!("{}", hash);
    Ok(())
}

/// Verify a token against the configured secret and print its claims
pub async fn decode_token(token: &str, config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let signer = TokenSigner::from_config(&config.auth);

    match signer.verify(token) {
        Ok(claims) => {
            success("Token is valid");
            print_claims(&claims);
            Ok(())
        }
        Err(e) => {
            error(&format!("Invalid token: {}", e));
            Err(e.into())
        }
    }
}

/// First line of piped input, without the line terminator
fn read_password(mut reader: impl BufRead) -> Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        bail!("No password given on stdin");
    }
    Ok(password.to_owned())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => config::load_config_from_path(path)?,
        None => config::load_config()?,
    };
    Ok(config)
}
