//! Blood-donation service — scheduling and lifecycle transitions.
//!
//! Donors schedule a donation against a hospital (optionally tied to one of
//! its approved campaigns). The hospital moves it through pending → approved
//! → completed; completing a donation awards points to the donor.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use hemolink_common::error::AppError;
use hemolink_common::types::{CampaignStatus, Donation, DonationStatus, Role};

use crate::campaigns::CampaignService;
use crate::rewards::RewardService;

/// Service layer for blood-donation operations.
pub struct DonationService;

/// Parameters for scheduling a donation.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ScheduleDonationParams {
    pub hospital_id: Uuid,
    pub campaign_id: Option<Uuid>,
    /// Whole blood units pledged (default 1).
    pub units: Option<i32>,
}

impl DonationService {
    /// Schedule a new donation for a donor. Starts `pending`.
    pub async fn schedule(
        pool: &PgPool,
        donor_id: Uuid,
        params: &ScheduleDonationParams,
    ) -> Result<Donation, AppError> {
        let units = params.units.unwrap_or(1);
        if units < 1 {
            return Err(AppError::Validation("units must be at least 1".to_string()));
        }

        if let Some(campaign_id) = params.campaign_id {
            let campaign = CampaignService::get(pool, campaign_id).await?;
            if campaign.status != CampaignStatus::Approved {
                return Err(AppError::Validation(format!(
                    "Campaign {} is not accepting donations (status: {})",
                    campaign_id, campaign.status
                )));
            }
            if campaign.hospital_id != params.hospital_id {
                return Err(AppError::Validation(
                    "campaign does not belong to the given hospital".to_string(),
                ));
            }
        }

        let id = Uuid::new_v4();
        let donation: Donation = sqlx::query_as(
            r#"
            INSERT INTO donations (id, donor_id, campaign_id, hospital_id, units, status)
            VALUES ($1, $2, $3, $4, $5, 'pending')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(donor_id)
        .bind(params.campaign_id)
        .bind(params.hospital_id)
        .bind(units)
        .fetch_one(pool)
        .await?;

        tracing::info!(
            donation_id = %donation.id,
            donor_id = %donor_id,
            hospital_id = %params.hospital_id,
            units,
            "Donation scheduled"
        );

        Ok(donation)
    }

    /// Get a single donation by ID.
    pub async fn get(pool: &PgPool, donation_id: Uuid) -> Result<Donation, AppError> {
        let donation: Donation = sqlx::query_as("SELECT * FROM donations WHERE id = $1")
            .bind(donation_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Donation {} not found", donation_id)))?;

        Ok(donation)
    }

    /// List donations visible to an account: donors see their own, hospitals
    /// see donations addressed to them, admins see everything.
    pub async fn list_for(
        pool: &PgPool,
        account_id: Uuid,
        role: Role,
        status: Option<DonationStatus>,
    ) -> Result<Vec<Donation>, AppError> {
        let donations: Vec<Donation> = sqlx::query_as(
            r#"
            SELECT * FROM donations
            WHERE ($1::text IS NULL OR status = $1)
              AND CASE $2::text
                    WHEN 'donor' THEN donor_id = $3
                    WHEN 'hospital' THEN hospital_id = $3
                    ELSE true
                  END
            ORDER BY created_at DESC
            "#,
        )
        .bind(status.map(|s| s.to_string()))
        .bind(role.to_string())
        .bind(account_id)
        .fetch_all(pool)
        .await?;

        Ok(donations)
    }

    /// Transition a donation's status.
    ///
    /// Hospitals may only act on their own donations; admins on any.
    /// Completing a donation stamps `donated_at` and awards points to the
    /// donor (recorded on the row so later config changes don't rewrite
    /// history).
    pub async fn transition(
        pool: &PgPool,
        donation_id: Uuid,
        next: DonationStatus,
        actor_id: Uuid,
        actor_role: Role,
    ) -> Result<Donation, AppError> {
        let existing = Self::get(pool, donation_id).await?;

        match actor_role {
            Role::Admin => {}
            Role::Hospital if existing.hospital_id == actor_id => {}
            _ => {
                return Err(AppError::Auth(
                    "Not authorized to update this donation".to_string(),
                ));
            }
        }

        if !Self::can_transition(existing.status, next) {
            return Err(AppError::Validation(format!(
                "Invalid status transition {} -> {}",
                existing.status, next
            )));
        }

        let donation = if next == DonationStatus::Completed {
            let points = RewardService::award_donation_points(pool, existing.donor_id, existing.units)
                .await?;

            let donation: Donation = sqlx::query_as(
                r#"
                UPDATE donations
                SET status = 'completed', donated_at = $1, points_awarded = $2
                WHERE id = $3
                RETURNING *
                "#,
            )
            .bind(Utc::now())
            .bind(points)
            .bind(donation_id)
            .fetch_one(pool)
            .await?;

            tracing::info!(
                donation_id = %donation_id,
                donor_id = %existing.donor_id,
                points,
                "Donation completed, points awarded"
            );

            donation
        } else {
            let donation: Donation =
                sqlx::query_as("UPDATE donations SET status = $1 WHERE id = $2 RETURNING *")
                    .bind(next)
                    .bind(donation_id)
                    .fetch_one(pool)
                    .await?;

            tracing::info!(donation_id = %donation_id, status = %next, "Donation updated");

            donation
        };

        Ok(donation)
    }

    /// Whether a donation status change is allowed.
    pub fn can_transition(from: DonationStatus, to: DonationStatus) -> bool {
        use DonationStatus::*;
        matches!(
            (from, to),
            (Pending, Approved) | (Pending, Rejected) | (Approved, Completed) | (Approved, Rejected)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_transitions() {
        assert!(DonationService::can_transition(
            DonationStatus::Pending,
            DonationStatus::Approved
        ));
        assert!(DonationService::can_transition(
            DonationStatus::Pending,
            DonationStatus::Rejected
        ));
        assert!(!DonationService::can_transition(
            DonationStatus::Pending,
            DonationStatus::Completed
        ));
    }

    #[test]
    fn test_approved_transitions() {
        assert!(DonationService::can_transition(
            DonationStatus::Approved,
            DonationStatus::Completed
        ));
        assert!(DonationService::can_transition(
            DonationStatus::Approved,
            DonationStatus::Rejected
        ));
    }

    #[test]
    fn test_completed_is_terminal() {
        assert!(!DonationService::can_transition(
            DonationStatus::Completed,
            DonationStatus::Pending
        ));
        assert!(!DonationService::can_transition(
            DonationStatus::Completed,
            DonationStatus::Rejected
        ));
    }
}
