//! Reward service — donation points and voucher redemption.
//!
//! Completed donations earn a flat number of points per unit. Donors spend
//! points on vouchers; the balance check rides in the deducting UPDATE so a
//! concurrent redemption can never drive the balance negative.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use hemolink_common::error::AppError;
use hemolink_common::types::{Voucher, VoucherStatus};

/// Points awarded per unit of whole blood donated.
pub const POINTS_PER_UNIT: i32 = 100;

/// Smallest redeemable voucher, in points.
pub const MIN_REDEEM_POINTS: i32 = 100;

/// Days until an issued voucher expires.
const VOUCHER_TTL_DAYS: i64 = 180;

/// Service layer for points and vouchers.
pub struct RewardService;

/// Parameters for redeeming points into a voucher.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RedeemPointsParams {
    pub points_cost: i32,
}

impl RewardService {
    /// Credit a donor's balance for a completed donation.
    /// Returns the number of points awarded.
    pub async fn award_donation_points(
        pool: &PgPool,
        donor_id: Uuid,
        units: i32,
    ) -> Result<i32, AppError> {
        let points = POINTS_PER_UNIT * units;

        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET points = points + $1, last_donation_at = NOW(), updated_at = NOW()
            WHERE id = $2 AND role = 'donor'
            "#,
        )
        .bind(points)
        .bind(donor_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Donor {} not found", donor_id)));
        }

        Ok(points)
    }

    /// Redeem points for a voucher. Fails when the balance is insufficient.
    pub async fn redeem_points(
        pool: &PgPool,
        donor_id: Uuid,
        params: &RedeemPointsParams,
    ) -> Result<Voucher, AppError> {
        if params.points_cost < MIN_REDEEM_POINTS {
            return Err(AppError::Validation(format!(
                "points_cost must be at least {}",
                MIN_REDEEM_POINTS
            )));
        }

        // Deduct and check the balance in one statement.
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET points = points - $1, updated_at = NOW()
            WHERE id = $2 AND role = 'donor' AND points >= $1
            "#,
        )
        .bind(params.points_cost)
        .bind(donor_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Validation(
                "insufficient points for this voucher".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let voucher: Voucher = sqlx::query_as(
            r#"
            INSERT INTO vouchers (id, donor_id, code, points_cost, status, expires_at)
            VALUES ($1, $2, $3, $4, 'active', $5)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(donor_id)
        .bind(Self::generate_code())
        .bind(params.points_cost)
        .bind(Utc::now() + Duration::days(VOUCHER_TTL_DAYS))
        .fetch_one(pool)
        .await?;

        tracing::info!(
            voucher_id = %voucher.id,
            donor_id = %donor_id,
            points_cost = params.points_cost,
            "Voucher issued"
        );

        Ok(voucher)
    }

    /// List a donor's vouchers, newest first.
    pub async fn list_by_donor(pool: &PgPool, donor_id: Uuid) -> Result<Vec<Voucher>, AppError> {
        let vouchers: Vec<Voucher> = sqlx::query_as(
            "SELECT * FROM vouchers WHERE donor_id = $1 ORDER BY issued_at DESC",
        )
        .bind(donor_id)
        .fetch_all(pool)
        .await?;

        Ok(vouchers)
    }

    /// Mark a presented voucher as redeemed.
    ///
    /// Only active, unexpired vouchers can be redeemed; a stale voucher is
    /// lazily marked expired on the attempt.
    pub async fn redeem_voucher(pool: &PgPool, voucher_id: Uuid) -> Result<Voucher, AppError> {
        let voucher: Voucher = sqlx::query_as("SELECT * FROM vouchers WHERE id = $1")
            .bind(voucher_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Voucher {} not found", voucher_id)))?;

        if voucher.status != VoucherStatus::Active {
            return Err(AppError::Validation(format!(
                "Voucher is {} and cannot be redeemed",
                voucher.status
            )));
        }

        if voucher.expires_at < Utc::now() {
            sqlx::query("UPDATE vouchers SET status = 'expired' WHERE id = $1")
                .bind(voucher_id)
                .execute(pool)
                .await?;
            return Err(AppError::Validation("Voucher has expired".to_string()));
        }

        let voucher: Voucher = sqlx::query_as(
            r#"
            UPDATE vouchers
            SET status = 'redeemed', redeemed_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(voucher_id)
        .fetch_one(pool)
        .await?;

        tracing::info!(voucher_id = %voucher_id, "Voucher redeemed");

        Ok(voucher)
    }

    fn generate_code() -> String {
        format!("hv_{}", Uuid::new_v4().to_string().replace('-', ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voucher_code_format() {
        let code = RewardService::generate_code();
        assert!(code.starts_with("hv_"));
        assert_eq!(code.len(), 3 + 32);
    }

    #[test]
    fn test_points_per_unit() {
        assert_eq!(POINTS_PER_UNIT * 3, 300);
    }
}
