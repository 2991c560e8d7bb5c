//! DevSync Auth - credential authentication and session tokens
//!
//! This is the library interface for DevSync Auth: the authenticator, its
//! storage and hashing seams, and the HTTP API built on top of them.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;

pub use auth::Authenticator;
pub use config::Config;
pub use error::{AuthError, Error};
