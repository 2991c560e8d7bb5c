//! JWT token handling

use crate::auth::models::{CredentialRecord, Role};
use crate::config::AuthConfig;
use crate::error::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    pub email: String,
    /// Role names, e.g. `ROLE_USER`
    pub roles: Vec<String>,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
    /// Token ID
    pub jti: String,
}

impl Claims {
    /// Create claims for a credential record valid for `ttl_secs`
    pub fn from_record(record: &CredentialRecord, ttl_secs: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: record.id.to_string(),
            username: record.username.clone(),
            email: record.email.clone(),
            roles: record.role_names(),
            iat: now,
            exp: now + ttl_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Numeric user ID, if the subject is one
    pub fn user_id(&self) -> Option<u64> {
        self.sub.parse().ok()
    }

    /// Roles embedded in the token. Names this build doesn't know are skipped.
    pub fn role_set(&self) -> BTreeSet<Role> {
        self.roles.iter().filter_map(|r| r.parse().ok()).collect()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.iter().any(|r| r == role.as_str())
    }

    /// Check if token is expired
    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp() > self.exp
    }
}

/// Signs and validates session tokens with a shared HS256 secret
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenSigner {
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.jwt_secret.as_bytes(), config.jwt_expiration_secs)
    }

    /// Create a token for a credential record
    pub fn issue(&self, record: &CredentialRecord) -> Result<String> {
        self.sign(&Claims::from_record(record, self.ttl_secs))
    }

    pub fn sign(&self, claims: &Claims) -> Result<String> {
        Ok(encode(&Header::default(), claims, &self.encoding)?)
    }

    /// Validate signature and expiry and decode the claims
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}
