//! Fast-path deduplication of processed webhook deliveries.
//!
//! Shopify redelivers webhooks aggressively; most duplicates arrive within
//! minutes of the original. This cache short-circuits those before any store
//! API traffic happens. It is process-local and best-effort - the unique
//! constraints in the database remain the durable guard across restarts and
//! multiple instances.

use std::time::Duration;

use moka::future::Cache;

const DEFAULT_CAPACITY: u64 = 10_000;
const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60); // 1 hour

/// Bounded, TTL'd set of recently processed webhook ids.
#[derive(Clone)]
pub struct ProcessedWebhooks {
    cache: Cache<String, ()>,
}

impl ProcessedWebhooks {
    /// Create a cache with default bounds (10k entries, 1 hour TTL).
    #[must_use]
    pub fn new() -> Self {
        Self::with_bounds(DEFAULT_CAPACITY, DEFAULT_TTL)
    }

    /// Create a cache with explicit bounds.
    #[must_use]
    pub fn with_bounds(capacity: u64, ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Record an id as processed, returning whether it was already present.
    pub async fn check_and_insert(&self, id: &str) -> bool {
        let seen = self.cache.contains_key(id);
        if !seen {
            self.cache.insert(id.to_string(), ()).await;
        }
        seen
    }
}

impl Default for ProcessedWebhooks {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProcessedWebhooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessedWebhooks")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_delivery_is_new() {
        let dedup = ProcessedWebhooks::new();
        assert!(!dedup.check_and_insert("customer-501").await);
    }

    #[tokio::test]
    async fn test_second_delivery_is_duplicate() {
        let dedup = ProcessedWebhooks::new();
        assert!(!dedup.check_and_insert("customer-501").await);
        assert!(dedup.check_and_insert("customer-501").await);
    }

    #[tokio::test]
    async fn test_distinct_ids_are_independent() {
        let dedup = ProcessedWebhooks::new();
        assert!(!dedup.check_and_insert("customer-501").await);
        assert!(!dedup.check_and_insert("customer-502").await);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let dedup = ProcessedWebhooks::with_bounds(100, Duration::from_millis(50));
        assert!(!dedup.check_and_insert("customer-501").await);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(!dedup.check_and_insert("customer-501").await);
    }
}
