//! HTTP route definitions.

pub mod api;
pub mod customers;
pub mod orders;
pub mod webhooks;

use axum::Router;

use crate::config::BridgeConfig;
use crate::state::AppState;

/// Build the full application router (health endpoints are added in main).
pub fn routes(config: &BridgeConfig) -> Router<AppState> {
    Router::new()
        .merge(webhooks::router())
        .merge(api::router(config))
        .merge(customers::router())
        .merge(orders::router())
}
