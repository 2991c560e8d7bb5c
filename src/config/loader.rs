//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;

pub const CONFIG_FILENAME: &str = "devsync.toml";

/// Load configuration from devsync.toml
pub fn load_config() -> Result<Config> {
    let config_path = find_config_file()?;
    load_config_from_path(&config_path)
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    let content = interpolate_env_vars(&content);
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Result<PathBuf> {
    let mut current = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(Error::ConfigNotFound);
        }
    }
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
pub fn interpolate_env_vars(content: &str) -> String {
    // This regex is a compile-time constant, panicking is acceptable here
    // as it indicates a programming error in the codebase, not a runtime issue
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("Invalid regex pattern - this is a bug in the codebase");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Random signing secret for freshly generated configs
pub fn generate_secret() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

/// Generate a default configuration file content
pub fn default_config_content(jwt_secret: &str) -> String {
    format!(
        r#"# DevSync Auth Configuration

[server]
host = "0.0.0.0"
port = 8080

[auth]
# Overridable with DEVSYNC_JWT_SECRET
jwt_secret = "${{DEVSYNC_JWT_SECRET:-{jwt_secret}}}"
jwt_expiration_secs = 86400
bcrypt_cost = 12

# Enables POST /api/auth/reset-admin-password.
# Leave commented out in production.
# [admin_reset]
# username = "admin"
# password = "${{DEVSYNC_ADMIN_RESET_PASSWORD}}"

# Accounts provisioned at startup. Generate hashes with
# `devsync-auth hash-password <password>`.
# [[users]]
# username = "admin"
# email = "admin@devsync.local"
# password_hash = "$2b$12$..."
# roles = ["admin"]
# status = "active"
"#
    )
}
