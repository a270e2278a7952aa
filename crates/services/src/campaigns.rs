//! Campaign service — CRUD and donor targeting for blood-drive campaigns.
//!
//! Campaigns are owned by a hospital account, carry a city plus an optional
//! list of targeted blood groups, and move through a small status lifecycle
//! (pending → approved → completed, with cancellation from either side).

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use hemolink_common::error::AppError;
use hemolink_common::types::{Account, BloodGroup, Campaign, CampaignStatus, TargetGroups};

/// Service layer for campaign operations.
pub struct CampaignService;

/// Parameters for creating a new campaign.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateCampaignParams {
    pub title: String,
    pub description: String,
    pub city: String,
    pub venue: String,
    /// Targeted blood groups; empty or omitted means "all groups".
    pub target_blood_groups: Option<Vec<String>>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Parameters for updating an existing campaign.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UpdateCampaignParams {
    pub title: Option<String>,
    pub description: Option<String>,
    pub city: Option<String>,
    pub venue: Option<String>,
    pub target_blood_groups: Option<Vec<String>>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub status: Option<CampaignStatus>,
}

impl CampaignService {
    /// Create a new campaign for a hospital. New campaigns start `pending`.
    pub async fn create(
        pool: &PgPool,
        hospital_id: Uuid,
        params: &CreateCampaignParams,
    ) -> Result<Campaign, AppError> {
        if params.title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".to_string()));
        }
        if params.city.trim().is_empty() {
            return Err(AppError::Validation("city must not be empty".to_string()));
        }
        if params.venue.trim().is_empty() {
            return Err(AppError::Validation("venue must not be empty".to_string()));
        }
        if params.starts_at >= params.ends_at {
            return Err(AppError::Validation(
                "starts_at must be before ends_at".to_string(),
            ));
        }

        let targets = Self::validate_targets(params.target_blood_groups.as_deref())?;

        let id = Uuid::new_v4();
        let campaign: Campaign = sqlx::query_as(
            r#"
            INSERT INTO campaigns
                (id, hospital_id, title, description, city, venue, target_blood_groups,
                 status, starts_at, ends_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', $8, $9)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(hospital_id)
        .bind(params.title.trim())
        .bind(&params.description)
        .bind(params.city.trim())
        .bind(params.venue.trim())
        .bind(serde_json::json!(targets))
        .bind(params.starts_at)
        .bind(params.ends_at)
        .fetch_one(pool)
        .await?;

        tracing::info!(
            campaign_id = %campaign.id,
            hospital_id = %hospital_id,
            city = %campaign.city,
            "Campaign created"
        );

        Ok(campaign)
    }

    /// List campaigns, newest first, with optional filters.
    pub async fn list(
        pool: &PgPool,
        city: Option<&str>,
        status: Option<CampaignStatus>,
        hospital_id: Option<Uuid>,
    ) -> Result<Vec<Campaign>, AppError> {
        let campaigns: Vec<Campaign> = sqlx::query_as(
            r#"
            SELECT * FROM campaigns
            WHERE ($1::text IS NULL OR city = $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR hospital_id = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(city)
        .bind(status.map(|s| s.to_string()))
        .bind(hospital_id)
        .fetch_all(pool)
        .await?;

        Ok(campaigns)
    }

    /// Get a single campaign by ID.
    pub async fn get(pool: &PgPool, campaign_id: Uuid) -> Result<Campaign, AppError> {
        let campaign: Campaign = sqlx::query_as("SELECT * FROM campaigns WHERE id = $1")
            .bind(campaign_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Campaign {} not found", campaign_id)))?;

        Ok(campaign)
    }

    /// Update a campaign's fields and/or status.
    ///
    /// Status changes are validated against the lifecycle table; approving a
    /// pending campaign is the caller's (admin's) decision and is checked at
    /// the route layer.
    pub async fn update(
        pool: &PgPool,
        campaign_id: Uuid,
        params: &UpdateCampaignParams,
    ) -> Result<Campaign, AppError> {
        let existing = Self::get(pool, campaign_id).await?;

        let status = match params.status {
            Some(next) => {
                if !Self::can_transition(existing.status, next) {
                    return Err(AppError::Validation(format!(
                        "Invalid status transition {} -> {}",
                        existing.status, next
                    )));
                }
                next
            }
            None => existing.status,
        };

        let targets = match params.target_blood_groups.as_deref() {
            Some(raw) => serde_json::json!(Self::validate_targets(Some(raw))?),
            None => existing.target_blood_groups,
        };

        let title = params.title.clone().unwrap_or(existing.title);
        let description = params.description.clone().unwrap_or(existing.description);
        let city = params.city.clone().unwrap_or(existing.city);
        let venue = params.venue.clone().unwrap_or(existing.venue);
        let starts_at = params.starts_at.unwrap_or(existing.starts_at);
        let ends_at = params.ends_at.unwrap_or(existing.ends_at);

        if starts_at >= ends_at {
            return Err(AppError::Validation(
                "starts_at must be before ends_at".to_string(),
            ));
        }

        let campaign: Campaign = sqlx::query_as(
            r#"
            UPDATE campaigns
            SET title = $1, description = $2, city = $3, venue = $4,
                target_blood_groups = $5, status = $6, starts_at = $7, ends_at = $8,
                updated_at = NOW()
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(title.trim())
        .bind(&description)
        .bind(city.trim())
        .bind(venue.trim())
        .bind(&targets)
        .bind(status)
        .bind(starts_at)
        .bind(ends_at)
        .bind(campaign_id)
        .fetch_one(pool)
        .await?;

        tracing::info!(campaign_id = %campaign_id, status = %campaign.status, "Campaign updated");

        Ok(campaign)
    }

    /// Delete a campaign. Returns true if it was deleted.
    pub async fn delete(pool: &PgPool, campaign_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = $1")
            .bind(campaign_id)
            .execute(pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(campaign_id = %campaign_id, "Campaign deleted");
        }

        Ok(deleted)
    }

    /// Find the donor segment a campaign targets: donors in the campaign's
    /// city, restricted to the targeted blood groups when the list is
    /// non-empty. An empty list broadcasts to all groups in the city.
    pub async fn find_target_donors(
        pool: &PgPool,
        campaign: &Campaign,
    ) -> Result<Vec<Account>, AppError> {
        let targets = TargetGroups::from_value(&campaign.target_blood_groups);
        let group_names: Vec<String> = targets.0.iter().map(|g| g.to_string()).collect();

        let donors: Vec<Account> = sqlx::query_as(
            r#"
            SELECT * FROM accounts
            WHERE role = 'donor'
              AND city = $1
              AND (cardinality($2::text[]) = 0 OR blood_group = ANY($2))
            ORDER BY created_at DESC
            "#,
        )
        .bind(&campaign.city)
        .bind(&group_names)
        .fetch_all(pool)
        .await?;

        Ok(donors)
    }

    /// Whether a campaign status change is allowed.
    pub fn can_transition(from: CampaignStatus, to: CampaignStatus) -> bool {
        use CampaignStatus::*;
        matches!(
            (from, to),
            (Pending, Approved) | (Pending, Cancelled) | (Approved, Completed) | (Approved, Cancelled)
        )
    }

    /// Parse and validate a raw target-group list. `None` means broadcast.
    fn validate_targets(raw: Option<&[String]>) -> Result<Vec<BloodGroup>, AppError> {
        let Some(entries) = raw else {
            return Ok(Vec::new());
        };

        entries
            .iter()
            .map(|s| {
                BloodGroup::parse_str(s).ok_or_else(|| {
                    AppError::Validation(format!(
                        "Unknown blood group '{}'. Valid groups: {}",
                        s,
                        BloodGroup::ALL
                            .iter()
                            .map(|g| g.to_string())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_can_be_approved_or_cancelled() {
        assert!(CampaignService::can_transition(
            CampaignStatus::Pending,
            CampaignStatus::Approved
        ));
        assert!(CampaignService::can_transition(
            CampaignStatus::Pending,
            CampaignStatus::Cancelled
        ));
        assert!(!CampaignService::can_transition(
            CampaignStatus::Pending,
            CampaignStatus::Completed
        ));
    }

    #[test]
    fn test_approved_can_complete_or_cancel() {
        assert!(CampaignService::can_transition(
            CampaignStatus::Approved,
            CampaignStatus::Completed
        ));
        assert!(CampaignService::can_transition(
            CampaignStatus::Approved,
            CampaignStatus::Cancelled
        ));
    }

    #[test]
    fn test_terminal_states_are_final() {
        assert!(!CampaignService::can_transition(
            CampaignStatus::Completed,
            CampaignStatus::Approved
        ));
        assert!(!CampaignService::can_transition(
            CampaignStatus::Cancelled,
            CampaignStatus::Pending
        ));
    }

    #[test]
    fn test_validate_targets_accepts_both_forms() {
        let raw = vec!["o_pos".to_string(), "AB-".to_string()];
        let parsed = CampaignService::validate_targets(Some(&raw)).unwrap();
        assert_eq!(parsed, vec![BloodGroup::OPos, BloodGroup::AbNeg]);
    }

    #[test]
    fn test_validate_targets_rejects_unknown() {
        let raw = vec!["x_pos".to_string()];
        assert!(CampaignService::validate_targets(Some(&raw)).is_err());
    }

    #[test]
    fn test_validate_targets_none_is_broadcast() {
        assert!(CampaignService::validate_targets(None).unwrap().is_empty());
    }
}
