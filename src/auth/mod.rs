//! Authentication and session token issuance

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod store;

pub use jwt::{Claims, TokenSigner};
pub use middleware::{bearer_token, AuthUser, JsonBody};
pub use models::{AccountStatus, CredentialRecord, Role, UserInfo};
pub use password::{BcryptHasher, PasswordHasher};
pub use service::{resolve_role_hints, Authenticator};
pub use store::{MemoryUserStore, UserStore};
