//! Fund service — financial donations.

use sqlx::PgPool;
use uuid::Uuid;

use hemolink_common::error::AppError;
use hemolink_common::types::FundDonation;

/// Service layer for financial donations.
pub struct FundService;

/// Parameters for recording a financial donation.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateFundDonationParams {
    pub donor_name: String,
    pub amount_cents: i64,
    /// ISO 4217 code, lowercase (default "usd").
    pub currency: Option<String>,
    pub message: Option<String>,
}

impl FundService {
    /// Record a financial donation. `donor_id` links the gift to an account
    /// when the giver was signed in.
    pub async fn create(
        pool: &PgPool,
        donor_id: Option<Uuid>,
        params: &CreateFundDonationParams,
    ) -> Result<FundDonation, AppError> {
        if params.donor_name.trim().is_empty() {
            return Err(AppError::Validation(
                "donor_name must not be empty".to_string(),
            ));
        }
        if params.amount_cents <= 0 {
            return Err(AppError::Validation(
                "amount_cents must be positive".to_string(),
            ));
        }

        let currency = params
            .currency
            .clone()
            .unwrap_or_else(|| "usd".to_string())
            .to_lowercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AppError::Validation(format!(
                "'{}' is not a valid ISO currency code",
                currency
            )));
        }

        let id = Uuid::new_v4();
        let donation: FundDonation = sqlx::query_as(
            r#"
            INSERT INTO fund_donations (id, donor_id, donor_name, amount_cents, currency, message)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(donor_id)
        .bind(params.donor_name.trim())
        .bind(params.amount_cents)
        .bind(&currency)
        .bind(&params.message)
        .fetch_one(pool)
        .await?;

        tracing::info!(
            fund_donation_id = %donation.id,
            amount_cents = params.amount_cents,
            currency = %currency,
            "Fund donation recorded"
        );

        Ok(donation)
    }

    /// List all fund donations, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<FundDonation>, AppError> {
        let donations: Vec<FundDonation> =
            sqlx::query_as("SELECT * FROM fund_donations ORDER BY created_at DESC")
                .fetch_all(pool)
                .await?;

        Ok(donations)
    }
}
