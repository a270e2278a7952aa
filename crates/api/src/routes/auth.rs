//! Authentication routes — registration, login, and API key rotation.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hemolink_common::error::AppError;
use hemolink_common::types::{Account, Role};
use hemolink_services::accounts::{AccountService, RegisterAccountParams};

use crate::middleware::auth::{AuthUser, encode_jwt};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/api-keys", post(rotate_api_key))
}

/// Request body for API-key login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub api_key: String,
}

/// Response for successful registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub account: Account,
    /// Shown once; exchange it for JWTs via /api/auth/login.
    pub api_key: String,
    pub token: String,
}

/// Response for successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub account_id: Uuid,
    pub role: Role,
}

/// Response for API key rotation.
#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub api_key: String,
}

/// POST /api/auth/register — Create a donor or hospital account.
async fn register(
    State(state): State<AppState>,
    Json(params): Json<RegisterAccountParams>,
) -> Result<Json<RegisterResponse>, AppError> {
    let (account, api_key) = AccountService::register(&state.pool, &params).await?;

    let token = encode_jwt(
        account.id,
        account.role,
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )?;

    Ok(Json(RegisterResponse {
        account,
        api_key,
        token,
    }))
}

/// POST /api/auth/login — Exchange an API key for a JWT.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let account = AccountService::find_by_api_key(&state.pool, &req.api_key)
        .await?
        .ok_or_else(|| AppError::Auth("Invalid API key".to_string()))?;

    let token = encode_jwt(
        account.id,
        account.role,
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )?;

    tracing::info!(account_id = %account.id, role = %account.role, "Account logged in");

    Ok(Json(LoginResponse {
        token,
        account_id: account.id,
        role: account.role,
    }))
}

/// POST /api/auth/api-keys — Rotate the authenticated account's API key.
async fn rotate_api_key(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiKeyResponse>, AppError> {
    let api_key = AccountService::rotate_api_key(&state.pool, auth.account_id).await?;
    Ok(Json(ApiKeyResponse { api_key }))
}
