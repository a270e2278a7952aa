//! Blood-donation routes.

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use hemolink_common::error::AppError;
use hemolink_common::types::{Donation, DonationStatus, Role};
use hemolink_services::donations::{DonationService, ScheduleDonationParams};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/donations", post(schedule_donation))
        .route("/api/donations", get(list_donations))
        .route("/api/donations/{id}", patch(update_donation))
}

#[derive(Debug, Deserialize)]
pub struct ListDonationsQuery {
    pub status: Option<DonationStatus>,
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
pub struct UpdateDonationRequest {
    pub status: DonationStatus,
}

/// POST /api/donations — Schedule a donation (donor accounts only).
async fn schedule_donation(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(params): Json<ScheduleDonationParams>,
) -> Result<Json<Donation>, AppError> {
    if auth.role != Role::Donor {
        return Err(AppError::Auth(
            "Only donor accounts can schedule donations".to_string(),
        ));
    }
    let donation = DonationService::schedule(&state.pool, auth.account_id, &params).await?;
    Ok(Json(donation))
}

/// GET /api/donations — List donations visible to the caller.
async fn list_donations(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListDonationsQuery>,
) -> Result<Json<Vec<Donation>>, AppError> {
    let donations =
        DonationService::list_for(&state.pool, auth.account_id, auth.role, query.status).await?;
    Ok(Json(donations))
}

/// PATCH /api/donations/:id — Transition a donation's status.
///
/// Hospitals act on their own donations; completing one awards points.
async fn update_donation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateDonationRequest>,
) -> Result<Json<Donation>, AppError> {
    let donation =
        DonationService::transition(&state.pool, id, req.status, auth.account_id, auth.role)
            .await?;
    Ok(Json(donation))
}
