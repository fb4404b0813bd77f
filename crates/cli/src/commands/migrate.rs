//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! pp-cli migrate bridge
//! ```
//!
//! # Environment Variables
//!
//! - `BRIDGE_DATABASE_URL` - `PostgreSQL` connection string for the bridge

use sqlx::PgPool;

/// Errors that can occur while running migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the bridge database migrations.
///
/// # Errors
///
/// Returns error if the database URL is missing, the connection fails, or a
/// migration cannot be applied.
pub async fn bridge() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("BRIDGE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrationError::MissingEnvVar("BRIDGE_DATABASE_URL"))?;

    tracing::info!("Connecting to bridge database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running bridge migrations...");
    sqlx::migrate!("../bridge/migrations").run(&pool).await?;

    tracing::info!("Bridge migrations complete!");
    Ok(())
}
