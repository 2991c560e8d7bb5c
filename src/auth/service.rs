//! Sign-in, sign-up and account administration

use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::auth::jwt::{Claims, TokenSigner};
use crate::auth::models::{
    AccountStatus, CredentialRecord, JwtResponse, MessageResponse, NewCredential, Role,
    SignupRequest, UserInfo,
};
use crate::auth::password::PasswordHasher;
use crate::auth::store::UserStore;
use crate::config::{AdminResetConfig, SeedUser};
use crate::error::{AuthError, AuthResult, Result};

/// Hashed once and verified against when the username is unknown, so a miss
/// costs as much as a wrong password.
const DECOY_PASSWORD: &str = "devsync-decoy-password";

/// Resolve sign-up role hints. No hints at all means `{User}`.
pub fn resolve_role_hints<'a>(hints: impl IntoIterator<Item = &'a str>) -> BTreeSet<Role> {
    let mut roles: BTreeSet<Role> = hints.into_iter().map(Role::from_hint).collect();
    if roles.is_empty() {
        roles.insert(Role::User);
    }
    roles
}

/// Authenticates credentials and issues session tokens
pub struct Authenticator {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    signer: TokenSigner,
    admin_reset: Option<AdminResetConfig>,
    decoy_hash: OnceCell<String>,
}

impl Authenticator {
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
        signer: TokenSigner,
    ) -> Self {
        Self {
            store,
            hasher,
            signer,
            admin_reset: None,
            decoy_hash: OnceCell::new(),
        }
    }

    /// Enable [`reset_admin_password`](Self::reset_admin_password)
    pub fn with_admin_reset(mut self, admin_reset: Option<AdminResetConfig>) -> Self {
        self.admin_reset = admin_reset;
        self
    }

    pub fn admin_reset_enabled(&self) -> bool {
        self.admin_reset.is_some()
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    async fn hash_password(&self, password: &str) -> Result<String> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password)).await?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await?
    }

    async fn burn_decoy(&self, password: &str) {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| self.hash_password(DECOY_PASSWORD))
            .await;
        if let Ok(hash) = decoy {
            let _ = self.verify_password(password, hash).await;
        }
    }

    /// Check a username/password pair and issue a session token
    pub async fn authenticate(&self, username: &str, password: &str) -> AuthResult<JwtResponse> {
        let username = username.trim();
        tracing::info!(username, "Sign-in attempt");

        match self.try_authenticate(username, password).await {
            Ok(response) => {
                tracing::info!(username, user_id = response.id, "Sign-in succeeded");
                Ok(response)
            }
            Err(err) => {
                tracing::warn!(username, reason = ?err, "Sign-in failed");
                Err(err)
            }
        }
    }

    async fn try_authenticate(&self, username: &str, password: &str) -> AuthResult<JwtResponse> {
        if !self.store.exists_by_username(username).await? {
            self.burn_decoy(password).await;
            return Err(AuthError::UnknownIdentity);
        }

        let Some(record) = self.store.find_by_username(username).await? else {
            return Err(AuthError::UnknownIdentity);
        };

        let matches = self
            .verify_password(password, &record.password_hash)
            .await
            .map_err(|e| AuthError::AuthenticationFailed(e.to_string()))?;
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        // Status is checked only once the password matched, so disabled and
        // locked accounts are indistinguishable from wrong passwords to anyone
        // who does not already hold the credentials.
        match record.status {
            AccountStatus::Active => {}
            AccountStatus::Disabled => return Err(AuthError::AccountDisabled),
            AccountStatus::Locked => return Err(AuthError::AccountLocked),
        }

        let token = self
            .signer
            .issue(&record)
            .map_err(|e| AuthError::AuthenticationFailed(e.to_string()))?;

        Ok(JwtResponse {
            token,
            token_type: "Bearer".to_string(),
            roles: record.role_names(),
            id: record.id,
            username: record.username,
            email: record.email,
        })
    }

    async fn lookup_roles(&self, wanted: BTreeSet<Role>) -> AuthResult<BTreeSet<Role>> {
        let mut roles = BTreeSet::new();
        for role in wanted {
            roles.insert(self.store.find_role(role).await?);
        }
        Ok(roles)
    }

    /// Create a new active account. Does not sign the user in.
    pub async fn register(&self, request: SignupRequest) -> AuthResult<MessageResponse> {
        let request = request.normalized();
        tracing::info!(username = %request.username, "Sign-up request");

        request.validate()?;

        if self.store.exists_by_username(&request.username).await? {
            return Err(AuthError::UsernameTaken);
        }
        if self.store.exists_by_email(&request.email).await? {
            return Err(AuthError::EmailTaken);
        }

        let hints = request.role.iter().flatten().map(String::as_str);
        let roles = self.lookup_roles(resolve_role_hints(hints)).await?;

        let password_hash = self
            .hash_password(&request.password)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let record = self
            .store
            .insert(NewCredential {
                username: request.username,
                email: request.email,
                password_hash,
                status: AccountStatus::Active,
                roles,
            })
            .await?;

        tracing::info!(
            username = %record.username,
            user_id = record.id,
            roles = ?record.roles,
            "User registered"
        );
        Ok(MessageResponse::new("User registered successfully!"))
    }

    /// Tokens are stateless, so this only acknowledges the request
    pub fn signout(&self, caller: Option<&Claims>) -> MessageResponse {
        match caller {
            Some(claims) => tracing::info!(username = %claims.username, "User signed out"),
            None => tracing::debug!("Sign-out without a valid token"),
        }
        MessageResponse::new("User signed out successfully!")
    }

    /// Reset the configured admin account to the configured password
    pub async fn reset_admin_password(&self) -> AuthResult<MessageResponse> {
        let Some(reset) = &self.admin_reset else {
            return Err(AuthError::NotFound("Admin password reset".to_string()));
        };

        let Some(admin) = self.store.find_by_username(&reset.username).await? else {
            tracing::warn!(username = %reset.username, "Admin password reset target missing");
            return Err(AuthError::NotFound("Admin user".to_string()));
        };

        let password_hash = self
            .hash_password(&reset.password)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        self.store.update_password(admin.id, password_hash).await?;

        tracing::warn!(username = %admin.username, user_id = admin.id, "Admin password reset");
        Ok(MessageResponse::new("Admin password reset successfully"))
    }

    /// Provision an account from config with a precomputed hash
    pub async fn import_user(&self, seed: &SeedUser) -> AuthResult<CredentialRecord> {
        let roles = self
            .lookup_roles(resolve_role_hints(seed.roles.iter().map(String::as_str)))
            .await?;

        let record = self
            .store
            .insert(NewCredential {
                username: seed.username.trim().to_string(),
                email: seed.email.trim().to_string(),
                password_hash: seed.password_hash.clone(),
                status: seed.status,
                roles,
            })
            .await?;

        tracing::info!(username = %record.username, user_id = record.id, "Provisioned user");
        Ok(record)
    }

    /// Validate a bearer token
    pub fn verify_token(&self, token: &str) -> AuthResult<Claims> {
        self.signer
            .verify(token)
            .map_err(|e| AuthError::Unauthorized(e.to_string()))
    }

    /// Current record for the token's subject
    pub async fn user_info(&self, claims: &Claims) -> AuthResult<UserInfo> {
        let id = claims
            .user_id()
            .ok_or_else(|| AuthError::Unauthorized("malformed subject".to_string()))?;
        let record = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User".to_string()))?;
        Ok(record.into())
    }
}
