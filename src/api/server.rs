//! HTTP API server

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{Authenticator, BcryptHasher, MemoryUserStore, TokenSigner, UserStore};
use crate::config::Config;
use crate::error::{Error, Result};

use super::routes;

/// Application state shared across handlers
pub struct AppState {
    pub authenticator: Authenticator,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wire the authenticator from config and provision seed users.
    /// Expects a config that already passed [`Config::validate`].
    pub async fn from_config(config: &Config) -> Result<Self> {
        if config.auth.uses_placeholder_secret() {
            tracing::warn!("auth.jwt_secret is the built-in placeholder; set a real secret");
        }

        let store: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
        let hasher = Arc::new(BcryptHasher::new(config.auth.bcrypt_cost));
        let authenticator = Authenticator::new(store, hasher, TokenSigner::from_config(&config.auth))
            .with_admin_reset(config.admin_reset.clone());

        for seed in &config.users {
            authenticator
                .import_user(seed)
                .await
                .map_err(|e| Error::Config(format!("users.{}: {}", seed.username, e)))?;
        }

        if authenticator.admin_reset_enabled() {
            tracing::warn!("Admin password reset endpoint is enabled");
        }

        Ok(Self { authenticator })
    }
}

/// Run the HTTP API server
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    let state = Arc::new(AppState::from_config(&config).await?);

    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Router {
    let mut auth = Router::new()
        .route("/signin", post(routes::signin))
        .route("/signup", post(routes::signup))
        .route("/signout", post(routes::signout))
        .route("/me", get(routes::me));

    if state.authenticator.admin_reset_enabled() {
        auth = auth.route("/reset-admin-password", post(routes::reset_admin_password));
    }

    Router::new()
        .route("/api/health", get(routes::health))
        .nest("/api/auth", auth)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
