//! Hospital registry routes.
//!
//! Listing and lookup are public so donors can discover hospitals before
//! signing up.

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use hemolink_common::error::AppError;
use hemolink_common::types::{Account, Role};
use hemolink_services::accounts::{AccountService, UpdateAccountParams};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/hospitals", get(list_hospitals))
        .route("/api/hospitals/{id}", get(get_hospital))
        .route("/api/hospitals/{id}", patch(update_hospital))
}

#[derive(Debug, Deserialize)]
pub struct ListHospitalsQuery {
    pub city: Option<String>,
}

/// GET /api/hospitals — List hospitals, optionally by city.
async fn list_hospitals(
    State(state): State<AppState>,
    Query(query): Query<ListHospitalsQuery>,
) -> Result<Json<Vec<Account>>, AppError> {
    let hospitals = AccountService::list_hospitals(&state.pool, query.city.as_deref()).await?;
    Ok(Json(hospitals))
}

/// GET /api/hospitals/:id — Fetch a single hospital.
async fn get_hospital(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Account>, AppError> {
    let account = AccountService::get(&state.pool, id).await?;
    if account.role != Role::Hospital {
        return Err(AppError::NotFound(format!("Hospital {} not found", id)));
    }
    Ok(Json(account))
}

/// PATCH /api/hospitals/:id — Update a hospital profile (self or admin).
async fn update_hospital(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(params): Json<UpdateAccountParams>,
) -> Result<Json<Account>, AppError> {
    auth.require_self_or_admin(id)?;
    let account = AccountService::update(&state.pool, id, &params).await?;
    Ok(Json(account))
}
