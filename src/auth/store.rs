//! Credential storage

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::models::{AccountStatus, CredentialRecord, NewCredential, Role};
use crate::error::{AuthError, AuthResult};

/// Access to credential records and the role table.
///
/// `insert` must enforce username and email uniqueness itself; the
/// authenticator's existence checks only give early, cheap failures.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn exists_by_username(&self, username: &str) -> AuthResult<bool>;
    async fn exists_by_email(&self, email: &str) -> AuthResult<bool>;
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<CredentialRecord>>;
    async fn find_by_id(&self, id: u64) -> AuthResult<Option<CredentialRecord>>;

    /// Look a role up in the role table, `RoleNotFound` if it is missing
    async fn find_role(&self, role: Role) -> AuthResult<Role>;

    async fn insert(&self, new: NewCredential) -> AuthResult<CredentialRecord>;
    async fn update_password(&self, id: u64, password_hash: String) -> AuthResult<()>;
    async fn set_status(&self, id: u64, status: AccountStatus) -> AuthResult<()>;
    async fn count(&self) -> AuthResult<usize>;
}

#[derive(Default)]
struct Tables {
    next_id: u64,
    records: HashMap<u64, CredentialRecord>,
    by_username: HashMap<String, u64>,
    by_email: HashMap<String, u64>,
    roles: BTreeSet<Role>,
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

/// In-memory store keyed by surrogate id
pub struct MemoryUserStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryUserStore {
    /// Create an empty store with every role present in the role table
    pub fn new() -> Self {
        Self::with_roles(Role::ALL)
    }

    /// Create an empty store whose role table holds only `roles`
    pub fn with_roles(roles: impl IntoIterator<Item = Role>) -> Self {
        let tables = Tables {
            next_id: 1,
            roles: roles.into_iter().collect(),
            ..Tables::default()
        };
        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryUserStore {
    fn clone(&self) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn exists_by_username(&self, username: &str) -> AuthResult<bool> {
        Ok(self.tables.read().await.by_username.contains_key(username))
    }

    async fn exists_by_email(&self, email: &str) -> AuthResult<bool> {
        Ok(self.tables.read().await.by_email.contains_key(&email_key(email)))
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<CredentialRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_username
            .get(username)
            .and_then(|id| tables.records.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: u64) -> AuthResult<Option<CredentialRecord>> {
        Ok(self.tables.read().await.records.get(&id).cloned())
    }

    async fn find_role(&self, role: Role) -> AuthResult<Role> {
        if self.tables.read().await.roles.contains(&role) {
            Ok(role)
        } else {
            Err(AuthError::RoleNotFound(role))
        }
    }

    async fn insert(&self, new: NewCredential) -> AuthResult<CredentialRecord> {
        let mut tables = self.tables.write().await;

        if tables.by_username.contains_key(&new.username) {
            return Err(AuthError::UsernameTaken);
        }
        let key = email_key(&new.email);
        if tables.by_email.contains_key(&key) {
            return Err(AuthError::EmailTaken);
        }

        let id = tables.next_id;
        tables.next_id += 1;

        let record = CredentialRecord::from_new(id, new);
        tables.by_username.insert(record.username.clone(), id);
        tables.by_email.insert(key, id);
        tables.records.insert(id, record.clone());
        Ok(record)
    }

    async fn update_password(&self, id: u64, password_hash: String) -> AuthResult<()> {
        let mut tables = self.tables.write().await;
        let record = tables
            .records
            .get_mut(&id)
            .ok_or_else(|| AuthError::NotFound(format!("User {}", id)))?;
        record.password_hash = password_hash;
        Ok(())
    }

    async fn set_status(&self, id: u64, status: AccountStatus) -> AuthResult<()> {
        let mut tables = self.tables.write().await;
        let record = tables
            .records
            .get_mut(&id)
            .ok_or_else(|| AuthError::NotFound(format!("User {}", id)))?;
        record.status = status;
        Ok(())
    }

    async fn count(&self) -> AuthResult<usize> {
        Ok(self.tables.read().await.records.len())
    }
}
