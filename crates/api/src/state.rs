//! Shared application state for the Axum API server.

use std::sync::Arc;

use redis::aio::ConnectionManager;
use sqlx::PgPool;

use hemolink_common::config::AppConfig;
use hemolink_notifier::Mailer;

/// Application state shared across all route handlers via Axum `State`.
///
/// `mailer` is `None` when no email-provider API key is configured; the
/// announce endpoint turns that into a configuration error before touching
/// the database for donors.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub redis: ConnectionManager,
    pub config: AppConfig,
    pub mailer: Option<Arc<dyn Mailer>>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        redis: ConnectionManager,
        config: AppConfig,
        mailer: Option<Arc<dyn Mailer>>,
    ) -> Self {
        Self {
            pool,
            redis,
            config,
            mailer,
        }
    }
}
