//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::BridgeConfig;
use crate::dedup::ProcessedWebhooks;
use crate::services::Notifier;
use crate::shopify::{ShopifyError, StoreClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections, the two store clients, and
/// configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BridgeConfig,
    pool: PgPool,
    partner: StoreClient,
    merchant: StoreClient,
    dedup: ProcessedWebhooks,
    notifier: Notifier,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if either store client cannot be constructed from
    /// its configuration.
    pub fn new(config: BridgeConfig, pool: PgPool) -> Result<Self, ShopifyError> {
        let partner = StoreClient::new(&config.partner)?;
        let merchant = StoreClient::new(&config.merchant)?;
        let notifier = Notifier::new(config.notify_url.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                partner,
                merchant,
                dedup: ProcessedWebhooks::new(),
                notifier,
            }),
        })
    }

    /// Get a reference to the bridge configuration.
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the partner store client (customers, draft orders).
    #[must_use]
    pub fn partner(&self) -> &StoreClient {
        &self.inner.partner
    }

    /// Get a reference to the merchant store client (orders, holds).
    #[must_use]
    pub fn merchant(&self) -> &StoreClient {
        &self.inner.merchant
    }

    /// Get a reference to the processed-webhook dedup cache.
    #[must_use]
    pub fn dedup(&self) -> &ProcessedWebhooks {
        &self.inner.dedup
    }

    /// Get a reference to the backend notifier.
    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }
}
