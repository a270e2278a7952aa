//! Campaign announcement fan-out.
//!
//! Loads a campaign, resolves its target donor segment (city + optional
//! blood-group list), and emails each matching donor sequentially. Each
//! send's outcome is recorded independently; one failure does not abort the
//! remaining sends. The summary counts attempts: an empty segment yields
//! `{0, 0, 0}` and no provider calls.

use redis::aio::ConnectionManager;
use sqlx::PgPool;
use uuid::Uuid;

use hemolink_common::error::AppError;
use hemolink_common::types::{Announcement, AnnouncementSummary, DeliveryStatus, Role};
use hemolink_notifier::template::render_announcement;
use hemolink_notifier::{Mailer, OutboundEmail};

use crate::campaigns::CampaignService;
use crate::cooldown::AnnouncementCooldown;

/// Service layer for campaign announcements.
pub struct AnnouncementService;

impl AnnouncementService {
    /// Announce a campaign to its target donor segment.
    ///
    /// The caller is responsible for verifying that email delivery is
    /// configured before invoking this (no donor query runs otherwise).
    /// Hospitals may only announce their own campaigns; admins any.
    #[allow(clippy::too_many_arguments)]
    pub async fn announce(
        pool: &PgPool,
        redis: &mut ConnectionManager,
        mailer: &dyn Mailer,
        cooldown_seconds: u64,
        campaign_id: Uuid,
        message: &str,
        actor_id: Uuid,
        actor_role: Role,
    ) -> Result<AnnouncementSummary, AppError> {
        if message.trim().is_empty() {
            return Err(AppError::Validation("message must not be empty".to_string()));
        }

        let campaign = CampaignService::get(pool, campaign_id).await?;

        match actor_role {
            Role::Admin => {}
            Role::Hospital if campaign.hospital_id == actor_id => {}
            _ => {
                return Err(AppError::Auth(
                    "Not authorized to announce this campaign".to_string(),
                ));
            }
        }

        if !AnnouncementCooldown::check_and_set(redis, campaign_id, cooldown_seconds).await? {
            return Err(AppError::Validation(format!(
                "Campaign was announced recently; retry after the {}s cooldown",
                cooldown_seconds
            )));
        }

        let donors = CampaignService::find_target_donors(pool, &campaign).await?;

        let announcement_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO announcements (id, campaign_id, message, total, sent, failed)
            VALUES ($1, $2, $3, 0, 0, 0)
            "#,
        )
        .bind(announcement_id)
        .bind(campaign_id)
        .bind(message)
        .execute(pool)
        .await?;

        let (subject, html) = render_announcement(&campaign, message);

        let mut summary = AnnouncementSummary {
            total: 0,
            success: 0,
            failed: 0,
        };

        // Sequential by design: no concurrency, no retries, no ordering
        // guarantees beyond the loop itself.
        for donor in &donors {
            if donor.email.trim().is_empty() {
                continue;
            }

            summary.total += 1;
            let email = OutboundEmail {
                to: donor.email.clone(),
                subject: subject.clone(),
                html: html.clone(),
            };

            match mailer.send(&email).await {
                Ok(()) => {
                    summary.success += 1;
                    Self::record_delivery(pool, announcement_id, &donor.email, DeliveryStatus::Sent, None)
                        .await?;
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(
                        campaign_id = %campaign_id,
                        recipient = %donor.email,
                        error = %e,
                        "Announcement email failed"
                    );
                    Self::record_delivery(
                        pool,
                        announcement_id,
                        &donor.email,
                        DeliveryStatus::Failed,
                        Some(e.to_string()),
                    )
                    .await?;
                }
            }
        }

        sqlx::query("UPDATE announcements SET total = $1, sent = $2, failed = $3 WHERE id = $4")
            .bind(summary.total as i32)
            .bind(summary.success as i32)
            .bind(summary.failed as i32)
            .bind(announcement_id)
            .execute(pool)
            .await?;

        tracing::info!(
            campaign_id = %campaign_id,
            announcement_id = %announcement_id,
            total = summary.total,
            success = summary.success,
            failed = summary.failed,
            "Announcement fan-out finished"
        );

        Ok(summary)
    }

    /// List a campaign's announcements, newest first.
    pub async fn list_by_campaign(
        pool: &PgPool,
        campaign_id: Uuid,
    ) -> Result<Vec<Announcement>, AppError> {
        let announcements = sqlx::query_as(
            "SELECT * FROM announcements WHERE campaign_id = $1 ORDER BY created_at DESC",
        )
        .bind(campaign_id)
        .fetch_all(pool)
        .await?;

        Ok(announcements)
    }

    async fn record_delivery(
        pool: &PgPool,
        announcement_id: Uuid,
        recipient: &str,
        status: DeliveryStatus,
        error_detail: Option<String>,
    ) -> Result<(), AppError> {
        let sent_at = match status {
            DeliveryStatus::Sent => Some(chrono::Utc::now()),
            _ => None,
        };

        sqlx::query(
            r#"
            INSERT INTO email_deliveries (id, announcement_id, recipient, status, error_detail, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(announcement_id)
        .bind(recipient)
        .bind(status)
        .bind(error_detail)
        .bind(sent_at)
        .execute(pool)
        .await?;

        Ok(())
    }
}
