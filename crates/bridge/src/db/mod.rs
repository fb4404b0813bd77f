//! Database operations for the bridge `PostgreSQL` instance.
//!
//! ## Tables
//!
//! - `customers` - Partner-store customers with their forwarding code pair
//! - `order_links` - Merchant order to partner draft order correlations
//!
//! Uniqueness (one customer per partner customer id, one link per merchant
//! order, one link per draft order) is enforced by native unique constraints
//! plus `ON CONFLICT DO NOTHING` conditional inserts, so concurrent webhook
//! redeliveries cannot race a check-then-insert.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/bridge/migrations/` and run via:
//! ```bash
//! cargo run -p pelican-cli -- migrate bridge
//! ```

pub mod customers;
pub mod order_links;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use customers::{Customer, NewCustomer, UpdateCustomer};
pub use order_links::{NewOrderLink, OrderLink};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate forwarding code).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
