//! Error types for DevSync Auth

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::auth::models::{MessageResponse, Role};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Config file not found. Run 'devsync-auth init' first.")]
    ConfigNotFound,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the sign-in, sign-up and admin flows.
///
/// Every variant renders as `{"message": ...}`. `UnknownIdentity` and
/// `InvalidCredentials` share a message so callers cannot discover
/// registered usernames; only the server log tells them apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    UnknownIdentity,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Account is locked")]
    AccountLocked,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Error: Username is already taken!")]
    UsernameTaken,

    #[error("Error: Email is already in use!")]
    EmailTaken,

    #[error("Error: Role {0} is not found.")]
    RoleNotFound(Role),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(MessageResponse::new(self.to_string()))).into_response()
    }
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;
