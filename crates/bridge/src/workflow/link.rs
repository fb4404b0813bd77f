//! Order linking: merchant "order paid" → hold → draft order → correlation.

use pelican_core::normalize_created_at;
use serde::Deserialize;
use tracing::instrument;

use crate::db::{self, NewOrderLink};
use crate::error::AppError;
use crate::shopify::HoldReason;
use crate::state::AppState;

/// Notes attached to the fulfillment hold on the merchant store.
const HOLD_NOTES: &str = "Used validation code";

/// Decoded merchant "order paid" webhook payload. The forwarding code
/// travels in the second address line.
#[derive(Debug, Clone, Deserialize)]
pub struct MerchantOrderPaid {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub order_number: Option<i64>,
    #[serde(default)]
    pub shipping_address: Option<PaidOrderShippingAddress>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Shipping address block; only address2 matters here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaidOrderShippingAddress {
    #[serde(default)]
    pub address2: Option<String>,
}

impl MerchantOrderPaid {
    /// The forwarding code presented at checkout, trimmed; `None` when the
    /// field is absent or blank.
    #[must_use]
    pub fn validation_code(&self) -> Option<String> {
        self.shipping_address
            .as_ref()
            .and_then(|a| a.address2.as_deref())
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
    }
}

/// Successful outcome of the linking workflow.
#[derive(Debug)]
pub struct LinkOutcome {
    /// Draft order created on the partner store.
    pub draft_order_id: String,
    /// Side-channel failures that did not fail the run.
    pub warnings: Vec<String>,
}

/// Process a merchant "order paid" event end-to-end.
///
/// Every step up to persistence is a hard gate: the first miss aborts the
/// workflow with a terminal error and nothing after it runs. The sequence is
/// strict and non-transactional - a crash between the hold and the draft
/// order leaves the hold in place with no correlation row, and only a
/// redelivery (stopped by the duplicate gate) or an operator can resolve it.
///
/// # Errors
///
/// Returns the gate-specific `AppError` for the first failing step.
#[instrument(skip(state, event), fields(merchant_order_id = event.id))]
pub async fn link_paid_order(
    state: &AppState,
    event: MerchantOrderPaid,
) -> Result<LinkOutcome, AppError> {
    // Gate 1: the validation code is required.
    let code = event.validation_code().ok_or_else(|| {
        AppError::Validation(
            "Address2 (validation code) is required in shipping_address".to_string(),
        )
    })?;

    let merchant_order_id = event
        .id
        .ok_or_else(|| AppError::Validation("Merchant order ID missing".to_string()))?
        .to_string();

    // Gate 2: the code must belong to a provisioned customer.
    let customer = db::customers::find_customer_by_code(state.pool(), &code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Invalid validation code: {code}")))?;

    // Gate 3: resolve customer + variant. Which code kind matched decides
    // the forwarding product billed on the partner store.
    let kind = customer
        .code_kind(&code)
        .ok_or_else(|| AppError::NotFound(format!("Invalid validation code: {code}")))?;
    let variant_id = state.config().variants.variant_for(kind);
    let partner_customer_id = customer.partner_customer_id.clone();

    tracing::info!(
        customer_id = %partner_customer_id,
        match_type = %kind,
        variant_id,
        "Validation code resolved"
    );

    // Gate 4: redelivery protection.
    if db::order_links::link_exists_for_merchant_order(state.pool(), &merchant_order_id).await? {
        return Err(AppError::Conflict(format!(
            "Draft order already exists for this merchant order ID: {merchant_order_id}"
        )));
    }

    // Gate 5: the paid order must have a fulfillment order to hold.
    let fulfillment_order_id = state
        .merchant()
        .get_fulfillment_order_id(&merchant_order_id)
        .await
        .ok_or_else(|| AppError::Upstream("Fulfillment order ID not found".to_string()))?;

    // Gate 6: hold shipment while the forwarding fee is collected.
    state
        .merchant()
        .place_fulfillment_hold(&fulfillment_order_id, HoldReason::Other, HOLD_NOTES)
        .await
        .map_err(|e| AppError::upstream("Failed to place order on hold", &e))?;

    // Gate 7: create the forwarding-fee draft order on the partner store.
    let draft_order = state
        .partner()
        .create_draft_order(&partner_customer_id, variant_id)
        .await
        .map_err(|e| AppError::upstream("Failed to create draft order", &e))?;
    let draft_order_id = draft_order.id.to_string();

    // Gate 8: persist the correlation. A `None` here means a concurrent
    // delivery won the race after gate 4; surface it the same way.
    let merchant_order_number = event.order_number.map(|n| n.to_string());
    let link = db::order_links::insert_order_link(
        state.pool(),
        NewOrderLink {
            merchant_order_id: merchant_order_id.clone(),
            validation_code: code,
            merchant_order_number: merchant_order_number.clone(),
            draft_order_id: Some(draft_order_id.clone()),
            created_at: normalize_created_at(event.created_at.as_deref()),
        },
    )
    .await?
    .ok_or_else(|| {
        AppError::Conflict(format!(
            "Draft order already exists for this merchant order ID: {merchant_order_id}"
        ))
    })?;

    tracing::info!(
        link_id = link.id,
        draft_order_id = %draft_order_id,
        "Order link persisted"
    );

    // Step 9 (best-effort): write the merchant order number back onto the
    // draft order so partner staff can find the originating order.
    let mut warnings = Vec::new();
    if let Some(order_number) = &merchant_order_number {
        if let Err(e) = state
            .partner()
            .add_draft_order_metafield(
                &draft_order_id,
                "custom",
                "merchant_order_number",
                order_number,
            )
            .await
        {
            tracing::error!(error = %e, "Failed to record merchant order number on draft order");
            warnings.push(format!(
                "Failed to record merchant order number on draft order: {e}"
            ));
        }
    }

    Ok(LinkOutcome {
        draft_order_id,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_code_trimmed() {
        let event: MerchantOrderPaid = serde_json::from_str(
            r#"{"id": 9001, "shipping_address": {"address2": "  pelicanabc123def456  "}}"#,
        )
        .expect("deserialize");
        assert_eq!(
            event.validation_code().as_deref(),
            Some("pelicanabc123def456")
        );
    }

    #[test]
    fn test_validation_code_missing_or_blank() {
        let no_address: MerchantOrderPaid =
            serde_json::from_str(r#"{"id": 9001}"#).expect("deserialize");
        assert!(no_address.validation_code().is_none());

        let blank: MerchantOrderPaid = serde_json::from_str(
            r#"{"id": 9001, "shipping_address": {"address2": "   "}}"#,
        )
        .expect("deserialize");
        assert!(blank.validation_code().is_none());

        let null: MerchantOrderPaid = serde_json::from_str(
            r#"{"id": 9001, "shipping_address": {"address2": null}}"#,
        )
        .expect("deserialize");
        assert!(null.validation_code().is_none());
    }

    #[test]
    fn test_payload_decodes_order_fields() {
        let event: MerchantOrderPaid = serde_json::from_str(
            r#"{
                "id": 9001,
                "order_number": 1042,
                "shipping_address": {"address2": "pelicansigxyz"},
                "created_at": "2024-03-01T10:00:00-05:00"
            }"#,
        )
        .expect("deserialize");

        assert_eq!(event.id, Some(9001));
        assert_eq!(event.order_number, Some(1042));
        assert_eq!(event.created_at.as_deref(), Some("2024-03-01T10:00:00-05:00"));
    }
}
