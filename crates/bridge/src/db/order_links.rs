//! Database operations for merchant-order to draft-order correlations.

use chrono::NaiveDateTime;
use sqlx::PgPool;

use super::RepositoryError;

/// A persisted correlation between a paid merchant order and the forwarding
/// draft order created for it on the partner store.
///
/// Written once, after the draft order is successfully created; never
/// updated afterwards (the backlink goes into a draft-order metafield, not
/// into this row).
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct OrderLink {
    /// Internal id.
    pub id: i32,
    /// Order id on the merchant store (unique).
    pub merchant_order_id: String,
    /// The forwarding code presented at checkout.
    pub validation_code: String,
    /// Human-facing order number on the merchant store.
    pub merchant_order_number: Option<String>,
    /// Draft order id on the partner store (unique).
    pub draft_order_id: Option<String>,
    /// Timezone-naive UTC creation instant.
    pub created_at: NaiveDateTime,
}

/// Fields for inserting a new order link.
#[derive(Debug, Clone)]
pub struct NewOrderLink {
    pub merchant_order_id: String,
    pub validation_code: String,
    pub merchant_order_number: Option<String>,
    pub draft_order_id: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Insert a link if none exists for the merchant order id.
///
/// Returns `None` when this merchant order is already linked. Callers must
/// treat that as "already processed", not as a failure - it is the
/// idempotency guard against webhook redelivery.
///
/// # Errors
///
/// Returns error if the database insert fails.
pub async fn insert_order_link(
    pool: &PgPool,
    new: NewOrderLink,
) -> Result<Option<OrderLink>, RepositoryError> {
    let link = sqlx::query_as::<_, OrderLink>(
        r"
        INSERT INTO order_links (
            merchant_order_id, validation_code, merchant_order_number,
            draft_order_id, created_at
        )
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (merchant_order_id) DO NOTHING
        RETURNING
            id, merchant_order_id, validation_code, merchant_order_number,
            draft_order_id, created_at
        ",
    )
    .bind(&new.merchant_order_id)
    .bind(&new.validation_code)
    .bind(&new.merchant_order_number)
    .bind(&new.draft_order_id)
    .bind(new.created_at)
    .fetch_optional(pool)
    .await?;

    Ok(link)
}

/// Get a link by merchant order id.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn get_by_merchant_order_id(
    pool: &PgPool,
    merchant_order_id: &str,
) -> Result<Option<OrderLink>, RepositoryError> {
    let link = sqlx::query_as::<_, OrderLink>(
        r"
        SELECT
            id, merchant_order_id, validation_code, merchant_order_number,
            draft_order_id, created_at
        FROM order_links
        WHERE merchant_order_id = $1
        ",
    )
    .bind(merchant_order_id)
    .fetch_optional(pool)
    .await?;

    Ok(link)
}

/// Get a link by partner draft order id (release-flow correlation lookup).
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn get_by_draft_order_id(
    pool: &PgPool,
    draft_order_id: &str,
) -> Result<Option<OrderLink>, RepositoryError> {
    let link = sqlx::query_as::<_, OrderLink>(
        r"
        SELECT
            id, merchant_order_id, validation_code, merchant_order_number,
            draft_order_id, created_at
        FROM order_links
        WHERE draft_order_id = $1
        ",
    )
    .bind(draft_order_id)
    .fetch_optional(pool)
    .await?;

    Ok(link)
}

/// Check whether a link already exists for the merchant order id.
///
/// Pre-flight duplicate gate; the conditional insert in
/// [`insert_order_link`] remains the authoritative guard.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn link_exists_for_merchant_order(
    pool: &PgPool,
    merchant_order_id: &str,
) -> Result<bool, RepositoryError> {
    let exists = sqlx::query_scalar::<_, bool>(
        r"
        SELECT EXISTS(
            SELECT 1 FROM order_links WHERE merchant_order_id = $1
        )
        ",
    )
    .bind(merchant_order_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}
