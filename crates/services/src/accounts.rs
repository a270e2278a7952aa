//! Account service — registration and profile CRUD for donors and hospitals.
//!
//! Accounts are a single table: donors carry a blood group and points balance,
//! hospitals a street address, admins neither. Registration issues an API key
//! that the auth layer exchanges for JWTs.

use sqlx::PgPool;
use uuid::Uuid;

use hemolink_common::error::AppError;
use hemolink_common::types::{Account, BloodGroup, Role};

/// Service layer for account operations.
pub struct AccountService;

/// Parameters for registering a new account.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegisterAccountParams {
    pub role: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: String,
    /// Required for donors, e.g. "o_pos" or "O+".
    pub blood_group: Option<String>,
    /// Street address, hospitals only.
    pub address: Option<String>,
}

/// Parameters for updating an account profile.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UpdateAccountParams {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub blood_group: Option<String>,
    pub address: Option<String>,
}

impl AccountService {
    /// Register a new donor or hospital account and issue an API key.
    ///
    /// Role `admin` is rejected; admins are provisioned out of band.
    pub async fn register(
        pool: &PgPool,
        params: &RegisterAccountParams,
    ) -> Result<(Account, String), AppError> {
        let role = match params.role.as_str() {
            "donor" => Role::Donor,
            "hospital" => Role::Hospital,
            other => {
                return Err(AppError::Validation(format!(
                    "Invalid role '{}'. Valid roles: donor, hospital",
                    other
                )));
            }
        };

        if params.name.trim().is_empty() {
            return Err(AppError::Validation("name must not be empty".to_string()));
        }
        if params.city.trim().is_empty() {
            return Err(AppError::Validation("city must not be empty".to_string()));
        }
        if !params.email.contains('@') {
            return Err(AppError::Validation(format!(
                "'{}' is not a valid email address",
                params.email
            )));
        }

        let blood_group = match role {
            Role::Donor => {
                let raw = params.blood_group.as_deref().ok_or_else(|| {
                    AppError::Validation("blood_group is required for donors".to_string())
                })?;
                Some(BloodGroup::parse_str(raw).ok_or_else(|| {
                    AppError::Validation(format!(
                        "Unknown blood group '{}'. Valid groups: {}",
                        raw,
                        BloodGroup::ALL
                            .iter()
                            .map(|g| g.to_string())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ))
                })?)
            }
            _ => None,
        };

        let id = Uuid::new_v4();
        let api_key = Self::generate_api_key();

        let account: Account = sqlx::query_as(
            r#"
            INSERT INTO accounts (id, role, name, email, phone, city, blood_group, address, api_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(role)
        .bind(params.name.trim())
        .bind(params.email.trim())
        .bind(&params.phone)
        .bind(params.city.trim())
        .bind(blood_group)
        .bind(&params.address)
        .bind(&api_key)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Validation(format!("email '{}' is already registered", params.email))
            }
            other => AppError::Database(other),
        })?;

        tracing::info!(
            account_id = %account.id,
            role = %account.role,
            city = %account.city,
            "Account registered"
        );

        Ok((account, api_key))
    }

    /// Get a single account by ID.
    pub async fn get(pool: &PgPool, account_id: Uuid) -> Result<Account, AppError> {
        let account: Account = sqlx::query_as("SELECT * FROM accounts WHERE id = $1")
            .bind(account_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Account {} not found", account_id)))?;

        Ok(account)
    }

    /// Look up an account by API key.
    pub async fn find_by_api_key(pool: &PgPool, api_key: &str) -> Result<Option<Account>, AppError> {
        let account: Option<Account> = sqlx::query_as("SELECT * FROM accounts WHERE api_key = $1")
            .bind(api_key)
            .fetch_optional(pool)
            .await?;

        Ok(account)
    }

    /// List donor accounts, optionally filtered by city and/or blood group.
    ///
    /// These are the same filters the announcement targeting applies.
    pub async fn list_donors(
        pool: &PgPool,
        city: Option<&str>,
        blood_group: Option<BloodGroup>,
    ) -> Result<Vec<Account>, AppError> {
        let donors: Vec<Account> = sqlx::query_as(
            r#"
            SELECT * FROM accounts
            WHERE role = 'donor'
              AND ($1::text IS NULL OR city = $1)
              AND ($2::text IS NULL OR blood_group = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(city)
        .bind(blood_group.map(|g| g.to_string()))
        .fetch_all(pool)
        .await?;

        Ok(donors)
    }

    /// List hospital accounts, optionally filtered by city.
    pub async fn list_hospitals(pool: &PgPool, city: Option<&str>) -> Result<Vec<Account>, AppError> {
        let hospitals: Vec<Account> = sqlx::query_as(
            r#"
            SELECT * FROM accounts
            WHERE role = 'hospital'
              AND ($1::text IS NULL OR city = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(city)
        .fetch_all(pool)
        .await?;

        Ok(hospitals)
    }

    /// Update an account's profile fields. Unset fields keep their value.
    pub async fn update(
        pool: &PgPool,
        account_id: Uuid,
        params: &UpdateAccountParams,
    ) -> Result<Account, AppError> {
        let existing = Self::get(pool, account_id).await?;

        let blood_group = match &params.blood_group {
            Some(raw) => Some(BloodGroup::parse_str(raw).ok_or_else(|| {
                AppError::Validation(format!("Unknown blood group '{}'", raw))
            })?),
            None => existing.blood_group,
        };

        let name = params.name.clone().unwrap_or(existing.name);
        let phone = params.phone.clone().or(existing.phone);
        let city = params.city.clone().unwrap_or(existing.city);
        let address = params.address.clone().or(existing.address);

        if name.trim().is_empty() {
            return Err(AppError::Validation("name must not be empty".to_string()));
        }
        if city.trim().is_empty() {
            return Err(AppError::Validation("city must not be empty".to_string()));
        }

        let account: Account = sqlx::query_as(
            r#"
            UPDATE accounts
            SET name = $1, phone = $2, city = $3, blood_group = $4, address = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(name.trim())
        .bind(&phone)
        .bind(city.trim())
        .bind(blood_group)
        .bind(&address)
        .bind(account_id)
        .fetch_one(pool)
        .await?;

        tracing::info!(account_id = %account_id, "Account updated");

        Ok(account)
    }

    /// Rotate an account's API key, invalidating the old one.
    pub async fn rotate_api_key(pool: &PgPool, account_id: Uuid) -> Result<String, AppError> {
        let api_key = Self::generate_api_key();

        sqlx::query("UPDATE accounts SET api_key = $1, updated_at = NOW() WHERE id = $2")
            .bind(&api_key)
            .bind(account_id)
            .execute(pool)
            .await?;

        tracing::info!(account_id = %account_id, "API key rotated");

        Ok(api_key)
    }

    /// Delete an account. Returns true if it was deleted.
    pub async fn delete(pool: &PgPool, account_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(account_id)
            .execute(pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(account_id = %account_id, "Account deleted");
        }

        Ok(deleted)
    }

    fn generate_api_key() -> String {
        format!("hl_{}", Uuid::new_v4().to_string().replace('-', ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_format() {
        let key = AccountService::generate_api_key();
        assert!(key.starts_with("hl_"));
        assert_eq!(key.len(), 3 + 32);
    }
}
