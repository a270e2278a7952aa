//! JWT authentication middleware and helpers.
//!
//! Provides JWT encoding/decoding plus an `AuthUser` Axum extractor
//! that validates the Authorization header on protected routes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hemolink_common::error::AppError;
use hemolink_common::types::Role;
use hemolink_services::accounts::AccountService;

use crate::state::AppState;

/// JWT claims stored in the token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject — the account's UUID
    pub sub: String,
    /// The account's role ("donor", "hospital", "admin")
    pub role: String,
    /// Expiration time (UNIX timestamp)
    pub exp: i64,
    /// Issued at (UNIX timestamp)
    pub iat: i64,
}

/// Authenticated account extracted from a JWT token or API key.
///
/// Use as an Axum extractor on protected routes:
/// ```ignore
/// async fn handler(auth: AuthUser) -> impl IntoResponse {
///     // auth.account_id / auth.role identify the caller
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account_id: Uuid,
    pub role: Role,
    pub claims: Claims,
}

impl AuthUser {
    /// Reject unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), AppError> {
        match self.role {
            Role::Admin => Ok(()),
            _ => Err(AppError::Auth("Admin access required".to_string())),
        }
    }

    /// Reject unless the caller has the given role (admins always pass).
    pub fn require_role(&self, role: Role) -> Result<(), AppError> {
        if self.role == role || self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Auth(format!("{} access required", role)))
        }
    }

    /// Reject unless the caller is the given account or an admin.
    pub fn require_self_or_admin(&self, account_id: Uuid) -> Result<(), AppError> {
        if self.account_id == account_id || self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Auth(
                "Not authorized to act on this account".to_string(),
            ))
        }
    }
}

/// Optional authentication: resolves to `None` instead of rejecting when no
/// valid credentials are present. Used on public routes that link the caller
/// when they happen to be signed in.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

/// Encode a JWT token for an account.
pub fn encode_jwt(
    account_id: Uuid,
    role: Role,
    secret: &str,
    expiry_hours: u64,
) -> Result<String, AppError> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiry_hours as i64);

    let claims = Claims {
        sub: account_id.to_string(),
        role: role.to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Auth(format!("Failed to encode JWT: {}", e)))?;

    Ok(token)
}

/// Decode and validate a JWT token.
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Auth(format!("Invalid token: {}", e)))?;

    Ok(token_data.claims)
}

fn parse_role(role: &str) -> Result<Role, AppError> {
    match role {
        "donor" => Ok(Role::Donor),
        "hospital" => Ok(Role::Hospital),
        "admin" => Ok(Role::Admin),
        other => Err(AppError::Auth(format!("Unknown role '{}' in token", other))),
    }
}

async fn authenticate(
    state: &AppState,
    auth_header: Option<String>,
    api_key_header: Option<String>,
) -> Result<AuthUser, AppError> {
    // Try JWT Bearer token first
    if let Some(auth) = auth_header
        && let Some(token) = auth.strip_prefix("Bearer ")
    {
        let claims = decode_jwt(token, &state.config.jwt_secret)?;
        let account_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Auth("Invalid account ID in token".to_string()))?;
        let role = parse_role(&claims.role)?;
        return Ok(AuthUser {
            account_id,
            role,
            claims,
        });
    }

    // Try API key
    if let Some(api_key) = api_key_header {
        if let Some(account) = AccountService::find_by_api_key(&state.pool, &api_key).await? {
            let now = Utc::now();
            let claims = Claims {
                sub: account.id.to_string(),
                role: account.role.to_string(),
                exp: (now + Duration::hours(24)).timestamp(),
                iat: now.timestamp(),
            };
            return Ok(AuthUser {
                account_id: account.id,
                role: account.role,
                claims,
            });
        }
    }

    Err(AppError::Auth(
        "Missing or invalid Authorization header. Use 'Bearer <JWT>' or 'X-API-Key: <key>'"
            .to_string(),
    ))
}

fn header_string(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Axum `FromRequestParts` implementation for `AuthUser`.
///
/// Extracts and validates the JWT from the `Authorization: Bearer <token>`
/// header. Also supports API key authentication via the `X-API-Key` header.
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let state = state.clone();
        let auth_header = header_string(parts, "authorization");
        let api_key_header = header_string(parts, "x-api-key");

        async move { authenticate(&state, auth_header, api_key_header).await }
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let state = state.clone();
        let auth_header = header_string(parts, "authorization");
        let api_key_header = header_string(parts, "x-api-key");

        async move {
            Ok(MaybeAuthUser(
                authenticate(&state, auth_header, api_key_header).await.ok(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-unit-tests";

    #[test]
    fn test_encode_decode_jwt() {
        let account_id = Uuid::new_v4();
        let token = encode_jwt(account_id, Role::Donor, TEST_SECRET, 24).unwrap();
        let claims = decode_jwt(&token, TEST_SECRET).unwrap();
        assert_eq!(claims.sub, account_id.to_string());
        assert_eq!(claims.role, "donor");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_invalid_secret_rejected() {
        let account_id = Uuid::new_v4();
        let token = encode_jwt(account_id, Role::Hospital, TEST_SECRET, 24).unwrap();
        let result = decode_jwt(&token, "wrong-secret");
        assert!(result.is_err());
    }

    #[test]
    fn test_expired_jwt_rejected() {
        let account_id = Uuid::new_v4();
        // Create a token that expired 1 hour ago
        let now = Utc::now();
        let exp = now - Duration::hours(1);
        let claims = Claims {
            sub: account_id.to_string(),
            role: "donor".to_string(),
            exp: exp.timestamp(),
            iat: (now - Duration::hours(2)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        let result = decode_jwt(&token, TEST_SECRET);
        assert!(result.is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let result = decode_jwt("not.a.valid.jwt", TEST_SECRET);
        assert!(result.is_err());
    }

    #[test]
    fn test_role_checks() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            role: "hospital".to_string(),
            exp: 0,
            iat: 0,
        };
        let auth = AuthUser {
            account_id: Uuid::new_v4(),
            role: Role::Hospital,
            claims,
        };

        assert!(auth.require_role(Role::Hospital).is_ok());
        assert!(auth.require_role(Role::Donor).is_err());
        assert!(auth.require_admin().is_err());
        assert!(auth.require_self_or_admin(auth.account_id).is_ok());
        assert!(auth.require_self_or_admin(Uuid::new_v4()).is_err());
    }
}
