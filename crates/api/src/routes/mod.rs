pub mod analytics;
pub mod auth;
pub mod campaigns;
pub mod donations;
pub mod donors;
pub mod funds;
pub mod health;
pub mod hospitals;
pub mod vouchers;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(donors::router())
        .merge(hospitals::router())
        .merge(campaigns::router())
        .merge(donations::router())
        .merge(vouchers::router())
        .merge(funds::router())
        .merge(analytics::router())
        .with_state(state)
}
