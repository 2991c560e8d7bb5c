//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::auth::models::AccountStatus;
use crate::error::{Error, Result};

/// Secret shipped in the generated defaults; startup warns when it is still in use
pub const PLACEHOLDER_JWT_SECRET: &str = "devsync-secret-key-change-in-production";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    /// Enables `POST /api/auth/reset-admin-password` when present
    #[serde(default)]
    pub admin_reset: Option<AdminResetConfig>,

    /// Accounts provisioned at startup
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

/// Server configuration for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Token signing and password hashing
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Session token lifetime
    #[serde(default = "default_jwt_expiration_secs")]
    pub jwt_expiration_secs: i64,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_jwt_secret() -> String {
    PLACEHOLDER_JWT_SECRET.to_string()
}

fn default_jwt_expiration_secs() -> i64 {
    86_400
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_expiration_secs: default_jwt_expiration_secs(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

impl AuthConfig {
    pub fn uses_placeholder_secret(&self) -> bool {
        self.jwt_secret == PLACEHOLDER_JWT_SECRET
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Administrative password reset target
#[derive(Clone, Serialize, Deserialize)]
pub struct AdminResetConfig {
    #[serde(default = "default_admin_username")]
    pub username: String,

    /// New plaintext password, usually `${ENV_VAR}`
    pub password: String,
}

fn default_admin_username() -> String {
    "admin".to_string()
}

impl fmt::Debug for AdminResetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminResetConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An account provisioned from config with a precomputed bcrypt hash
#[derive(Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,

    /// Same hints as sign-up: "admin", "mod", anything else means user
    #[serde(default)]
    pub roles: BTreeSet<String>,

    #[serde(default)]
    pub status: AccountStatus,
}

impl fmt::Debug for SeedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("roles", &self.roles)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(Error::Config("auth.jwt_secret must not be empty".to_string()));
        }
        if self.auth.jwt_expiration_secs <= 0 {
            return Err(Error::Config(
                "auth.jwt_expiration_secs must be positive".to_string(),
            ));
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(Error::Config(format!(
                "auth.bcrypt_cost must be between 4 and 31, got {}",
                self.auth.bcrypt_cost
            )));
        }
        if let Some(reset) = &self.admin_reset {
            if reset.password.is_empty() {
                return Err(Error::Config(
                    "admin_reset.password must not be empty".to_string(),
                ));
            }
        }
        for user in &self.users {
            if user.password_hash.is_empty() {
                return Err(Error::Config(format!(
                    "users.{}: password_hash is required",
                    user.username
                )));
            }
        }

        Ok(())
    }
}
