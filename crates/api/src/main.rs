//! Hemolink API server binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use hemolink_common::config::AppConfig;
use hemolink_common::db::create_pool;
use hemolink_common::redis_pool::create_redis_pool;
use hemolink_notifier::Mailer;
use hemolink_notifier::resend::ResendMailer;

use hemolink_api::routes::create_router;
use hemolink_api::state::AppState;

/// Sender used when EMAIL_FROM is not configured.
const DEFAULT_EMAIL_FROM: &str = "Hemolink <no-reply@hemolink.org>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("hemolink_api=debug,hemolink_services=debug,tower_http=debug")
        }))
        .init();

    tracing::info!("Starting Hemolink API server...");

    // Load configuration
    let config = AppConfig::from_env()?;

    // Create database connection pool
    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    tracing::info!("Database pool created");

    // Run migrations
    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    // Create Redis connection
    let redis = create_redis_pool(&config.redis_url).await?;
    tracing::info!("Redis connection established");

    // Email delivery is optional; the announce endpoint rejects with a
    // configuration error when no API key is present.
    let mailer: Option<Arc<dyn Mailer>> = match &config.resend_api_key {
        Some(api_key) => {
            let from = config
                .email_from
                .clone()
                .unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string());
            Some(Arc::new(ResendMailer::new(api_key.clone(), from)))
        }
        None => {
            tracing::warn!("RESEND_API_KEY not set; announcement delivery disabled");
            None
        }
    };

    // Build application state
    let port = config.api_port;
    let state = AppState::new(pool, redis, config, mailer);

    // Build router
    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(256 * 1024));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run with graceful shutdown on Ctrl+C
    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
        }
    }

    Ok(())
}
