//! Announcement cooldown — Redis-backed per-campaign send throttle.
//!
//! After an announcement goes out, the campaign enters a cooldown window
//! during which further announcements are suppressed. This keeps a
//! double-submitted form or an over-eager organizer from emailing the same
//! donor segment twice in quick succession.
//!
//! Uses Redis `SET NX EX` for atomic check-and-set with automatic TTL expiry.

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use uuid::Uuid;

use hemolink_common::error::AppError;

/// Redis-backed announcement cooldown.
pub struct AnnouncementCooldown;

impl AnnouncementCooldown {
    /// Check if a campaign is in cooldown, and if not, start the cooldown.
    ///
    /// Returns `true` if the campaign is NOT in cooldown (the announcement
    /// should proceed), `false` if it IS (the announcement is suppressed).
    pub async fn check_and_set(
        redis: &mut ConnectionManager,
        campaign_id: Uuid,
        cooldown_seconds: u64,
    ) -> Result<bool, AppError> {
        let key = format!("campaign:announce:cooldown:{}", campaign_id);

        // SET key "1" NX EX cooldown_seconds
        // Returns Some("OK") if key was set (not in cooldown)
        // Returns None if key already exists (in cooldown)
        let result: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg("1")
            .arg("NX")
            .arg("EX")
            .arg(cooldown_seconds)
            .query_async(redis)
            .await?;

        let allowed = result.is_some();

        if !allowed {
            tracing::debug!(
                campaign_id = %campaign_id,
                cooldown_seconds,
                "Announcement suppressed, campaign in cooldown"
            );
        }

        Ok(allowed)
    }

    /// Clear the cooldown for a campaign (e.g. after a cancelled run).
    pub async fn clear(
        redis: &mut ConnectionManager,
        campaign_id: Uuid,
    ) -> Result<(), AppError> {
        let key = format!("campaign:announce:cooldown:{}", campaign_id);
        redis.del::<_, ()>(&key).await?;
        Ok(())
    }
}
