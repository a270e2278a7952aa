//! Campaign CRUD and announcement routes.

use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use hemolink_common::error::AppError;
use hemolink_common::types::{Announcement, AnnouncementSummary, Campaign, CampaignStatus, Role};
use hemolink_services::announcements::AnnouncementService;
use hemolink_services::campaigns::{
    CampaignService, CreateCampaignParams, UpdateCampaignParams,
};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/campaigns", post(create_campaign))
        .route("/api/campaigns", get(list_campaigns))
        .route("/api/campaigns/{id}", get(get_campaign))
        .route("/api/campaigns/{id}", patch(update_campaign))
        .route("/api/campaigns/{id}", delete(delete_campaign))
        .route("/api/campaigns/{id}/announce", post(announce_campaign))
        .route("/api/campaigns/{id}/announcements", get(list_announcements))
}

/// Query filters for campaign listing.
#[derive(Debug, Deserialize)]
pub struct ListCampaignsQuery {
    pub city: Option<String>,
    pub status: Option<CampaignStatus>,
    pub hospital_id: Option<Uuid>,
}

/// Request body for an announcement.
#[derive(Debug, Deserialize)]
pub struct AnnounceRequest {
    pub message: String,
}

/// POST /api/campaigns — Create a campaign (hospital accounts only).
async fn create_campaign(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(params): Json<CreateCampaignParams>,
) -> Result<Json<Campaign>, AppError> {
    if auth.role != Role::Hospital {
        return Err(AppError::Auth(
            "Only hospital accounts can create campaigns".to_string(),
        ));
    }
    let campaign = CampaignService::create(&state.pool, auth.account_id, &params).await?;
    Ok(Json(campaign))
}

/// GET /api/campaigns — List campaigns (public).
async fn list_campaigns(
    State(state): State<AppState>,
    Query(query): Query<ListCampaignsQuery>,
) -> Result<Json<Vec<Campaign>>, AppError> {
    let campaigns = CampaignService::list(
        &state.pool,
        query.city.as_deref(),
        query.status,
        query.hospital_id,
    )
    .await?;
    Ok(Json(campaigns))
}

/// GET /api/campaigns/:id — Fetch a single campaign (public).
async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Campaign>, AppError> {
    let campaign = CampaignService::get(&state.pool, id).await?;
    Ok(Json(campaign))
}

/// PATCH /api/campaigns/:id — Update a campaign (owner hospital or admin).
///
/// Approving a pending campaign is reserved for admins.
async fn update_campaign(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(params): Json<UpdateCampaignParams>,
) -> Result<Json<Campaign>, AppError> {
    let existing = CampaignService::get(&state.pool, id).await?;
    auth.require_self_or_admin(existing.hospital_id)?;

    if params.status == Some(CampaignStatus::Approved) {
        auth.require_admin()?;
    }

    let campaign = CampaignService::update(&state.pool, id, &params).await?;
    Ok(Json(campaign))
}

/// DELETE /api/campaigns/:id — Delete a campaign (owner hospital or admin).
async fn delete_campaign(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let existing = CampaignService::get(&state.pool, id).await?;
    auth.require_self_or_admin(existing.hospital_id)?;

    let deleted = CampaignService::delete(&state.pool, id).await?;
    if deleted {
        Ok(Json(serde_json::json!({"deleted": true})))
    } else {
        Err(AppError::NotFound(format!("Campaign {} not found", id)))
    }
}

/// POST /api/campaigns/:id/announce — Email the campaign's donor segment.
///
/// Fails with a configuration error when no email-provider API key is set;
/// this is checked before any donor query executes.
async fn announce_campaign(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AnnounceRequest>,
) -> Result<Json<AnnouncementSummary>, AppError> {
    let mailer = state.mailer.clone().ok_or_else(|| {
        AppError::Config("Email delivery is not configured (missing API key)".to_string())
    })?;

    let mut redis = state.redis.clone();
    let summary = AnnouncementService::announce(
        &state.pool,
        &mut redis,
        mailer.as_ref(),
        state.config.announcement_cooldown_seconds,
        id,
        &req.message,
        auth.account_id,
        auth.role,
    )
    .await?;

    Ok(Json(summary))
}

/// GET /api/campaigns/:id/announcements — Past announcements (owner or admin).
async fn list_announcements(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Announcement>>, AppError> {
    let campaign = CampaignService::get(&state.pool, id).await?;
    auth.require_self_or_admin(campaign.hospital_id)?;

    let announcements = AnnouncementService::list_by_campaign(&state.pool, id).await?;
    Ok(Json(announcements))
}
