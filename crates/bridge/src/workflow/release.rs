//! Hold release: partner "order paid" → correlation lookup → release.
//!
//! When the forwarding-fee order on the partner store is paid, the hold
//! placed on the originating merchant order is released. The partner order
//! carries the draft-order id in a metafield; the persisted correlation maps
//! that back to the merchant order.

use serde::Deserialize;
use tracing::instrument;

use crate::db;
use crate::error::AppError;
use crate::shopify::Metafield;
use crate::state::AppState;

/// Metafield on the partner order pointing at the originating draft order.
const DRAFT_ID_NAMESPACE: &str = "custom";
const DRAFT_ID_KEY: &str = "draft_id";

const DRAFT_ORDER_GID_PREFIX: &str = "gid://shopify/DraftOrder/";

/// Decoded partner "order paid" webhook payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PartnerOrderPaid {
    #[serde(default)]
    pub id: Option<i64>,
}

/// Successful outcome of the release workflow.
#[derive(Debug)]
pub struct ReleaseOutcome {
    /// Merchant order whose hold was released.
    pub merchant_order_id: String,
}

/// Extract the draft-order id from a partner order's metafields.
///
/// Accepts a bare numeric id or a `gid://shopify/DraftOrder/<id>` GID in the
/// `custom/draft_id` metafield.
#[must_use]
pub fn parse_draft_order_id(metafields: &[Metafield]) -> Option<String> {
    let metafield = metafields
        .iter()
        .find(|m| m.namespace == DRAFT_ID_NAMESPACE && m.key == DRAFT_ID_KEY)?;

    let value = metafield.value.trim();
    if let Some(id) = value.strip_prefix(DRAFT_ORDER_GID_PREFIX) {
        return (!id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
            .then(|| id.to_string());
    }
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        return Some(value.to_string());
    }

    tracing::error!(value = %metafield.value, "Unexpected draft order ID format");
    None
}

/// Process a partner "order paid" event end-to-end.
///
/// Every lookup failure is a distinct terminal state with no retry; the
/// partner's redelivery drives another attempt.
///
/// # Errors
///
/// Returns the gate-specific `AppError` for the first failing step.
#[instrument(skip(state, event), fields(partner_order_id = event.id))]
pub async fn release_hold_for_paid_draft(
    state: &AppState,
    event: PartnerOrderPaid,
) -> Result<ReleaseOutcome, AppError> {
    let partner_order_id = event
        .id
        .ok_or_else(|| AppError::Validation("Partner order ID missing".to_string()))?
        .to_string();

    let metafields = state
        .partner()
        .get_order_metafields(&partner_order_id)
        .await
        .map_err(|e| {
            AppError::upstream(
                format!("Order metafields not found for {partner_order_id}"),
                &e,
            )
        })?;

    let draft_order_id = parse_draft_order_id(&metafields).ok_or_else(|| {
        AppError::NotFound(format!("Draft order ID not found for {partner_order_id}"))
    })?;

    let link = db::order_links::get_by_draft_order_id(state.pool(), &draft_order_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No linked merchant order for draft order ID: {draft_order_id}"
            ))
        })?;

    let fulfillment_order_id = state
        .merchant()
        .get_fulfillment_order_id(&link.merchant_order_id)
        .await
        .ok_or_else(|| {
            AppError::Upstream(format!(
                "Fulfillment order not found for {}",
                link.merchant_order_id
            ))
        })?;

    state
        .merchant()
        .release_fulfillment_hold(&fulfillment_order_id)
        .await
        .map_err(|e| AppError::upstream("Failed to release hold", &e))?;

    tracing::info!(
        merchant_order_id = %link.merchant_order_id,
        "Hold released for paid draft order"
    );

    Ok(ReleaseOutcome {
        merchant_order_id: link.merchant_order_id,
    })
}
