//! Financial donation routes.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use hemolink_common::error::AppError;
use hemolink_common::types::FundDonation;
use hemolink_services::analytics::{CurrencyTotal, fund_totals};
use hemolink_services::funds::{CreateFundDonationParams, FundService};

use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/funds", post(create_fund_donation))
        .route("/api/funds", get(list_fund_donations))
}

/// Response for the admin fund listing.
#[derive(Debug, Serialize)]
pub struct FundListResponse {
    pub donations: Vec<FundDonation>,
    pub totals: Vec<CurrencyTotal>,
}

/// POST /api/funds — Record a financial donation (public; linked to the
/// caller's account when they are signed in).
async fn create_fund_donation(
    State(state): State<AppState>,
    maybe_auth: MaybeAuthUser,
    Json(params): Json<CreateFundDonationParams>,
) -> Result<Json<FundDonation>, AppError> {
    let donor_id = maybe_auth.0.map(|auth| auth.account_id);
    let donation = FundService::create(&state.pool, donor_id, &params).await?;
    Ok(Json(donation))
}

/// GET /api/funds — List fund donations with per-currency totals (admin only).
async fn list_fund_donations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<FundListResponse>, AppError> {
    auth.require_admin()?;

    let donations = FundService::list(&state.pool).await?;
    let totals = fund_totals(&donations);

    Ok(Json(FundListResponse { donations, totals }))
}
