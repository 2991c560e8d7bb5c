//! Authentication models

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{AuthError, AuthResult};

/// Authorization grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Standard user
    #[serde(rename = "ROLE_USER")]
    User,
    /// Can moderate channels
    #[serde(rename = "ROLE_MODERATOR")]
    Moderator,
    /// Administrator - full access
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Moderator, Role::Admin];

    /// Map a free-text sign-up hint to a role. Unknown hints fall back to `User`.
    pub fn from_hint(hint: &str) -> Self {
        match hint {
            "admin" => Role::Admin,
            "mod" => Role::Moderator,
            _ => Role::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Moderator => "ROLE_MODERATOR",
            Role::Admin => "ROLE_ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> AuthResult<Self> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AuthError::Validation(format!("unknown role '{}'", s)))
    }
}

/// Account lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Disabled,
    Locked,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "active"),
            AccountStatus::Disabled => write!(f, "disabled"),
            AccountStatus::Locked => write!(f, "locked"),
        }
    }
}

/// A stored credential
#[derive(Clone, Serialize)]
pub struct CredentialRecord {
    /// Surrogate identifier assigned by the store
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub(crate) password_hash: String,
    pub status: AccountStatus,
    pub roles: BTreeSet<Role>,
    pub created_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Build a record from an insert payload once the store has picked an id
    pub fn from_new(id: u64, new: NewCredential) -> Self {
        Self {
            id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            status: new.status,
            roles: new.roles,
            created_at: Utc::now(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(Role::to_string).collect()
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("status", &self.status)
            .field("roles", &self.roles)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Insert payload for [`UserStore::insert`](crate::auth::UserStore::insert)
#[derive(Clone)]
pub struct NewCredential {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub status: AccountStatus,
    pub roles: BTreeSet<Role>,
}

impl fmt::Debug for NewCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewCredential")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("status", &self.status)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

/// Login credentials
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Sign-up payload
#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Free-text role hints ("admin", "mod", anything else means user)
    #[serde(default)]
    pub role: Option<BTreeSet<String>>,
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .expect("Invalid regex pattern - this is a bug in the codebase")
});

impl SignupRequest {
    /// Strip surrounding whitespace from the identity fields
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }

    pub fn validate(&self) -> AuthResult<()> {
        let username_len = self.username.chars().count();
        if !(3..=20).contains(&username_len) {
            return Err(AuthError::Validation(
                "Username must be 3-20 characters".to_string(),
            ));
        }

        if self.email.trim().is_empty() || self.email.chars().count() > 50 {
            return Err(AuthError::Validation(
                "Email must be 1-50 characters".to_string(),
            ));
        }
        if !EMAIL_RE.is_match(&self.email) {
            return Err(AuthError::Validation("Invalid email address".to_string()));
        }

        let password_len = self.password.chars().count();
        if !(1..=40).contains(&password_len) {
            return Err(AuthError::Validation(
                "Password must be 1-40 characters".to_string(),
            ));
        }

        Ok(())
    }
}

/// Successful sign-in
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub id: u64,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

/// Plain `{message}` body used for every non-token response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// User information in responses
#[derive(Debug, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

impl From<CredentialRecord> for UserInfo {
    fn from(record: CredentialRecord) -> Self {
        Self {
            roles: record.role_names(),
            id: record.id,
            username: record.username,
            email: record.email,
            status: record.status,
            created_at: record.created_at,
        }
    }
}
