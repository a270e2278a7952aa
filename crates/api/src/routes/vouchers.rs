//! Reward voucher routes.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use hemolink_common::error::AppError;
use hemolink_common::types::{Role, Voucher};
use hemolink_services::rewards::{RedeemPointsParams, RewardService};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/vouchers", post(redeem_points))
        .route("/api/vouchers", get(list_vouchers))
        .route("/api/vouchers/{id}/redeem", post(redeem_voucher))
}

/// POST /api/vouchers — Spend points on a voucher (donor accounts only).
async fn redeem_points(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(params): Json<RedeemPointsParams>,
) -> Result<Json<Voucher>, AppError> {
    if auth.role != Role::Donor {
        return Err(AppError::Auth(
            "Only donor accounts can redeem points".to_string(),
        ));
    }
    let voucher = RewardService::redeem_points(&state.pool, auth.account_id, &params).await?;
    Ok(Json(voucher))
}

/// GET /api/vouchers — List the caller's vouchers.
async fn list_vouchers(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Voucher>>, AppError> {
    let vouchers = RewardService::list_by_donor(&state.pool, auth.account_id).await?;
    Ok(Json(vouchers))
}

/// POST /api/vouchers/:id/redeem — Mark a presented voucher as redeemed
/// (hospital or admin).
async fn redeem_voucher(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Voucher>, AppError> {
    auth.require_role(Role::Hospital)?;
    let voucher = RewardService::redeem_voucher(&state.pool, id).await?;
    Ok(Json(voucher))
}
