//! Analytics routes.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use hemolink_common::error::AppError;
use hemolink_services::analytics::{AnalyticsOverview, AnalyticsService};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/analytics", get(analytics_overview))
}

/// GET /api/analytics — Donor funnel and distribution aggregates.
async fn analytics_overview(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<AnalyticsOverview>, AppError> {
    let overview = AnalyticsService::overview(&state.pool).await?;
    Ok(Json(overview))
}
