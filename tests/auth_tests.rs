//! Authenticator tests
//! Sign-in, sign-up, role resolution and the admin reset flow

use devsync_auth::auth::models::{AccountStatus, Role, SignupRequest};
use devsync_auth::auth::{
    Authenticator, BcryptHasher, MemoryUserStore, PasswordHasher, TokenSigner, UserStore,
};
use devsync_auth::config::{AdminResetConfig, SeedUser};
use devsync_auth::AuthError;
use std::collections::BTreeSet;
use std::sync::Arc;

const SECRET: &[u8] = b"auth-tests-secret";

fn authenticator_with_store(store: MemoryUserStore) -> Authenticator {
    Authenticator::new(
        Arc::new(store),
        Arc::new(BcryptHasher::new(4)),
        TokenSigner::new(SECRET, 3600),
    )
}

fn authenticator() -> Authenticator {
    authenticator_with_store(MemoryUserStore::new())
}

fn signup(username: &str, email: &str, password: &str, roles: Option<&[&str]>) -> SignupRequest {
    SignupRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role: roles.map(|r| r.iter().map(|s| s.to_string()).collect()),
    }
}

async fn stored_roles(auth: &Authenticator, username: &str) -> BTreeSet<Role> {
    auth.store()
        .find_by_username(username)
        .await
        .unwrap()
        .expect("user should exist")
        .roles
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_then_sign_in() {
    let auth = authenticator();

    let msg = auth
        .register(signup("alice", "alice@x.com", "pw1", None))
        .await
        .unwrap();
    assert_eq!(msg.message, "User registered successfully!");

    let response = auth.authenticate("alice", "pw1").await.unwrap();
    assert_eq!(response.username, "alice");
    assert_eq!(response.email, "alice@x.com");
    assert_eq!(response.token_type, "Bearer");
    assert_eq!(response.roles, vec!["ROLE_USER"]);
    assert_eq!(response.token.split('.').count(), 3);
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let auth = authenticator();
    auth.register(signup("alice", "alice@x.com", "pw1", None))
        .await
        .unwrap();

    let err = auth
        .register(signup("alice", "other@x.com", "pw2", None))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::UsernameTaken);

    // Username is checked first even when the email also collides
    let err = auth
        .register(signup("alice", "alice@x.com", "pw2", None))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::UsernameTaken);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let auth = authenticator();
    auth.register(signup("alice", "alice@x.com", "pw1", None))
        .await
        .unwrap();

    let err = auth
        .register(signup("bob", "alice@x.com", "pw2", None))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::EmailTaken);
    assert_eq!(auth.store().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_register_without_hints_is_user() {
    let auth = authenticator();
    auth.register(signup("alice", "alice@x.com", "pw1", None))
        .await
        .unwrap();
    auth.register(signup("bob", "bob@x.com", "pw1", Some(&[])))
        .await
        .unwrap();

    assert_eq!(stored_roles(&auth, "alice").await, BTreeSet::from([Role::User]));
    assert_eq!(stored_roles(&auth, "bob").await, BTreeSet::from([Role::User]));
}

#[tokio::test]
async fn test_register_unknown_hint_falls_back_to_user() {
    let auth = authenticator();
    auth.register(signup("alice", "alice@x.com", "pw1", Some(&["admin", "bogus"])))
        .await
        .unwrap();

    assert_eq!(
        stored_roles(&auth, "alice").await,
        BTreeSet::from([Role::Admin, Role::User])
    );
}

#[tokio::test]
async fn test_register_moderator() {
    let auth = authenticator();
    auth.register(signup("mo", "mo@x.com", "pw1", Some(&["mod"])))
        .await
        .unwrap();

    let response = auth.authenticate("mo", "pw1").await.unwrap();
    assert_eq!(response.roles, vec!["ROLE_MODERATOR"]);
}

#[tokio::test]
async fn test_register_missing_role_table_entry() {
    let auth = authenticator_with_store(MemoryUserStore::with_roles([Role::User]));

    let err = auth
        .register(signup("alice", "alice@x.com", "pw1", Some(&["admin"])))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::RoleNotFound(Role::Admin));

    // All-or-nothing: nothing persisted
    assert_eq!(auth.store().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_register_rejects_invalid_input() {
    let auth = authenticator();

    let err = auth
        .register(signup("al", "al@x.com", "pw1", None))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));

    let err = auth
        .register(signup("alice", "alice-at-x", "pw1", None))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));
    assert_eq!(auth.store().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_register_ignores_surrounding_whitespace() {
    let auth = authenticator();
    auth.register(signup("alice", "alice@x.com", "pw1", None))
        .await
        .unwrap();

    for (i, padded) in ["alice ", " alice", "\talice\n"].into_iter().enumerate() {
        let err = auth
            .register(signup(padded, &format!("alice{}@x.com", i), "pw1", None))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::UsernameTaken);
    }
    assert_eq!(auth.store().count().await.unwrap(), 1);

    let err = auth
        .register(signup("bob", " alice@x.com ", "pw1", None))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::EmailTaken);

    auth.register(signup("  carol  ", "carol@x.com", "pw1", None))
        .await
        .unwrap();
    let record = auth.store().find_by_username("carol").await.unwrap().unwrap();
    assert_eq!(record.username, "carol");
    assert_eq!(auth.authenticate(" carol ", "pw1").await.unwrap().username, "carol");
}

#[tokio::test]
async fn test_register_creates_active_record() {
    let store = MemoryUserStore::new();
    let auth = authenticator_with_store(store.clone());
    auth.register(signup("alice", "alice@x.com", "plaintext-pw", None))
        .await
        .unwrap();

    let record = store.find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(record.status, AccountStatus::Active);
    assert_eq!(record.email, "alice@x.com");
    assert!(!serde_json::to_string(&record).unwrap().contains("plaintext-pw"));
}

#[tokio::test]
async fn test_concurrent_registration_single_winner() {
    let auth = Arc::new(authenticator());
    let mut handles = Vec::new();
    for i in 0..8 {
        let auth = Arc::clone(&auth);
        handles.push(tokio::spawn(async move {
            auth.register(signup("alice", &format!("alice{}@x.com", i), "pw1", None))
                .await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(err) => assert_eq!(err, AuthError::UsernameTaken),
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(auth.store().count().await.unwrap(), 1);
}

// ============================================================================
// Sign-in
// ============================================================================

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let auth = authenticator();
    auth.register(signup("alice", "alice@x.com", "pw1", None))
        .await
        .unwrap();

    let err = auth.authenticate("alice", "wrong").await.unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);
}

#[tokio::test]
async fn test_unknown_user_looks_like_bad_password() {
    let auth = authenticator();
    auth.register(signup("alice", "alice@x.com", "pw1", None))
        .await
        .unwrap();

    let unknown = auth.authenticate("nobody", "pw1").await.unwrap_err();
    let wrong = auth.authenticate("alice", "nope").await.unwrap_err();

    assert_eq!(unknown, AuthError::UnknownIdentity);
    assert_eq!(unknown.to_string(), wrong.to_string());
    assert_eq!(unknown.status_code(), wrong.status_code());
}

#[tokio::test]
async fn test_token_roles_match_persisted_roles() {
    let auth = authenticator();
    auth.register(signup("root", "root@x.com", "pw1", Some(&["admin", "mod", "user"])))
        .await
        .unwrap();

    let response = auth.authenticate("root", "pw1").await.unwrap();
    let claims = auth.verify_token(&response.token).unwrap();

    assert_eq!(claims.role_set(), stored_roles(&auth, "root").await);
    assert_eq!(claims.user_id(), Some(response.id));
    assert_eq!(claims.email, "root@x.com");
}

#[tokio::test]
async fn test_disabled_and_locked_accounts() {
    let store = MemoryUserStore::new();
    let auth = authenticator_with_store(store.clone());
    auth.register(signup("dora", "dora@x.com", "pw1", None))
        .await
        .unwrap();
    auth.register(signup("lock", "lock@x.com", "pw1", None))
        .await
        .unwrap();

    let dora = store.find_by_username("dora").await.unwrap().unwrap();
    let lock = store.find_by_username("lock").await.unwrap().unwrap();
    store.set_status(dora.id, AccountStatus::Disabled).await.unwrap();
    store.set_status(lock.id, AccountStatus::Locked).await.unwrap();

    assert_eq!(
        auth.authenticate("dora", "pw1").await.unwrap_err(),
        AuthError::AccountDisabled
    );
    assert_eq!(
        auth.authenticate("lock", "pw1").await.unwrap_err(),
        AuthError::AccountLocked
    );

    // Status is only revealed to callers holding the password
    assert_eq!(
        auth.authenticate("dora", "wrong").await.unwrap_err(),
        AuthError::InvalidCredentials
    );

    // Reactivation
    store.set_status(dora.id, AccountStatus::Active).await.unwrap();
    assert!(auth.authenticate("dora", "pw1").await.is_ok());
}

#[tokio::test]
async fn test_corrupt_hash_is_authentication_failed() {
    let auth = authenticator();
    auth.import_user(&SeedUser {
        username: "broken".to_string(),
        email: "broken@x.com".to_string(),
        password_hash: "not-a-bcrypt-hash".to_string(),
        roles: BTreeSet::new(),
        status: AccountStatus::Active,
    })
    .await
    .unwrap();

    let err = auth.authenticate("broken", "pw1").await.unwrap_err();
    assert!(matches!(err, AuthError::AuthenticationFailed(_)));
}

#[tokio::test]
async fn test_register_and_sign_in_scenario() {
    let auth = authenticator();

    assert!(auth
        .register(signup("alice", "alice@x.com", "pw1", None))
        .await
        .is_ok());
    assert_eq!(
        auth.register(signup("alice", "other@x.com", "pw2", None))
            .await
            .unwrap_err(),
        AuthError::UsernameTaken
    );

    let response = auth.authenticate("alice", "pw1").await.unwrap();
    assert_eq!(response.roles, vec!["ROLE_USER"]);

    assert_eq!(
        auth.authenticate("alice", "wrong").await.unwrap_err(),
        AuthError::InvalidCredentials
    );
}

// ============================================================================
// Sign-out, provisioning, admin reset
// ============================================================================

#[tokio::test]
async fn test_signout_does_not_revoke_token() {
    let auth = authenticator();
    auth.register(signup("alice", "alice@x.com", "pw1", None))
        .await
        .unwrap();
    let response = auth.authenticate("alice", "pw1").await.unwrap();
    let claims = auth.verify_token(&response.token).unwrap();

    let msg = auth.signout(Some(&claims));
    assert_eq!(msg.message, "User signed out successfully!");
    assert_eq!(auth.signout(None).message, msg.message);

    assert!(auth.verify_token(&response.token).is_ok());
}

#[tokio::test]
async fn test_import_user_with_precomputed_hash() {
    let auth = authenticator();
    let hash = BcryptHasher::new(4).hash("seeded-pw").unwrap();

    let record = auth
        .import_user(&SeedUser {
            username: "admin".to_string(),
            email: "admin@devsync.local".to_string(),
            password_hash: hash,
            roles: BTreeSet::from(["admin".to_string()]),
            status: AccountStatus::Active,
        })
        .await
        .unwrap();
    assert!(record.has_role(Role::Admin));
    assert!(!record.has_role(Role::User));

    let response = auth.authenticate("admin", "seeded-pw").await.unwrap();
    assert_eq!(response.roles, vec!["ROLE_ADMIN"]);

    let info = auth
        .user_info(&auth.verify_token(&response.token).unwrap())
        .await
        .unwrap();
    assert_eq!(info.username, "admin");
    assert_eq!(info.status, AccountStatus::Active);
}

#[tokio::test]
async fn test_admin_reset_disabled_by_default() {
    let auth = authenticator();
    assert!(!auth.admin_reset_enabled());
    assert!(matches!(
        auth.reset_admin_password().await,
        Err(AuthError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_admin_reset_missing_admin() {
    let auth = authenticator().with_admin_reset(Some(AdminResetConfig {
        username: "admin".to_string(),
        password: "fresh-pw".to_string(),
    }));

    let err = auth.reset_admin_password().await.unwrap_err();
    assert_eq!(err, AuthError::NotFound("Admin user".to_string()));
    assert_eq!(err.to_string(), "Admin user not found");
}

#[tokio::test]
async fn test_admin_reset_replaces_password() {
    let auth = authenticator().with_admin_reset(Some(AdminResetConfig {
        username: "admin".to_string(),
        password: "fresh-pw".to_string(),
    }));
    auth.register(signup("admin", "admin@x.com", "old-pw", Some(&["admin"])))
        .await
        .unwrap();

    let msg = auth.reset_admin_password().await.unwrap();
    assert!(!msg.message.contains("fresh-pw"));

    assert_eq!(
        auth.authenticate("admin", "old-pw").await.unwrap_err(),
        AuthError::InvalidCredentials
    );
    assert!(auth.authenticate("admin", "fresh-pw").await.is_ok());
}

#[test]
fn test_foreign_token_rejected() {
    let auth = authenticator();
    let other = TokenSigner::new(b"some-other-secret", 3600);
    let record = devsync_auth::auth::CredentialRecord::from_new(
        1,
        devsync_auth::auth::models::NewCredential {
            username: "mallory".to_string(),
            email: "m@x.com".to_string(),
            password_hash: String::new(),
            status: AccountStatus::Active,
            roles: BTreeSet::from([Role::Admin]),
        },
    );
    let token = other.issue(&record).unwrap();

    assert!(matches!(
        auth.verify_token(&token),
        Err(AuthError::Unauthorized(_))
    ));
}
