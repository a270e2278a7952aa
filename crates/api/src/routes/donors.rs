//! Donor registry routes.

use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, patch};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use hemolink_common::error::AppError;
use hemolink_common::types::{Account, BloodGroup, Role};
use hemolink_services::accounts::{AccountService, UpdateAccountParams};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/donors", get(list_donors))
        .route("/api/donors/{id}", get(get_donor))
        .route("/api/donors/{id}", patch(update_donor))
        .route("/api/donors/{id}", delete(delete_donor))
}

/// Query filters for donor listing.
#[derive(Debug, Deserialize)]
pub struct ListDonorsQuery {
    pub city: Option<String>,
    /// Storage form ("o_pos") or clinical label ("O+").
    pub blood_group: Option<String>,
}

/// GET /api/donors — List donors with optional city/blood-group filters.
async fn list_donors(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListDonorsQuery>,
) -> Result<Json<Vec<Account>>, AppError> {
    let blood_group = match &query.blood_group {
        Some(raw) => Some(BloodGroup::parse_str(raw).ok_or_else(|| {
            AppError::Validation(format!("Unknown blood group '{}'", raw))
        })?),
        None => None,
    };

    let donors = AccountService::list_donors(&state.pool, query.city.as_deref(), blood_group).await?;
    Ok(Json(donors))
}

/// GET /api/donors/:id — Fetch a single donor.
async fn get_donor(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Account>, AppError> {
    let account = AccountService::get(&state.pool, id).await?;
    if account.role != Role::Donor {
        return Err(AppError::NotFound(format!("Donor {} not found", id)));
    }
    Ok(Json(account))
}

/// PATCH /api/donors/:id — Update a donor profile (self or admin).
async fn update_donor(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(params): Json<UpdateAccountParams>,
) -> Result<Json<Account>, AppError> {
    auth.require_self_or_admin(id)?;
    let account = AccountService::update(&state.pool, id, &params).await?;
    Ok(Json(account))
}

/// DELETE /api/donors/:id — Remove a donor account (admin only).
async fn delete_donor(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require_admin()?;
    let deleted = AccountService::delete(&state.pool, id).await?;
    if deleted {
        Ok(Json(serde_json::json!({"deleted": true})))
    } else {
        Err(AppError::NotFound(format!("Donor {} not found", id)))
    }
}
