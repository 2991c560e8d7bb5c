//! API route handlers

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use super::server::SharedState;
use crate::auth::models::{JwtResponse, LoginRequest, MessageResponse, SignupRequest, UserInfo};
use crate::auth::{AuthUser, JsonBody};
use crate::error::AuthResult;

// Health check

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

// Auth routes

pub async fn signin(
    State(state): State<SharedState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AuthResult<Json<JwtResponse>> {
    state
        .authenticator
        .authenticate(&req.username, &req.password)
        .await
        .map(Json)
}

pub async fn signup(
    State(state): State<SharedState>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> AuthResult<Json<MessageResponse>> {
    state.authenticator.register(req).await.map(Json)
}

pub async fn signout(
    State(state): State<SharedState>,
    caller: Option<AuthUser>,
) -> Json<MessageResponse> {
    Json(state.authenticator.signout(caller.as_ref().map(|user| &user.0)))
}

pub async fn reset_admin_password(
    State(state): State<SharedState>,
) -> AuthResult<Json<MessageResponse>> {
    state.authenticator.reset_admin_password().await.map(Json)
}

pub async fn me(
    State(state): State<SharedState>,
    AuthUser(claims): AuthUser,
) -> AuthResult<Json<UserInfo>> {
    state.authenticator.user_info(&claims).await.map(Json)
}
