//! Webhook handlers for both stores.
//!
//! Bodies are extracted as raw `Bytes` so signature verification runs over
//! the exact bytes Shopify signed; JSON parsing happens only after the check
//! passes.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::post,
};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::instrument;

use crate::config::StoreConfig;
use crate::error::AppError;
use crate::state::AppState;
use crate::webhooks::{SIGNATURE_HEADER, verify_webhook};
use crate::workflow::{
    CustomerCreated, MerchantOrderPaid, PartnerOrderPaid, ProvisionOutcome, link_paid_order,
    provision_customer, release_hold_for_paid_draft,
};

/// Build the webhook router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/webhooks/partner/customers/enable",
            post(partner_customer_created),
        )
        .route("/webhooks/partner/orders/paid", post(partner_order_paid))
        .route("/webhooks/merchant/orders/paid", post(merchant_order_paid))
}

/// Verify the delivery signature for a store, then decode the payload.
///
/// Verification is skipped (with a warning) when the store has no webhook
/// secret configured.
fn authenticate_and_decode<T: DeserializeOwned>(
    store: &StoreConfig,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<T, AppError> {
    if let Some(secret) = &store.webhook_secret {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::InvalidSignature)?;

        if !verify_webhook(body, signature, secret.expose_secret()) {
            tracing::error!(store = %store.store, "Invalid webhook signature");
            return Err(AppError::InvalidSignature);
        }
    } else {
        tracing::warn!(store = %store.store, "Webhook signature verification skipped");
    }

    serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("Invalid payload: {e}")))
}

/// POST /webhooks/partner/customers/enable - provision a customer.
#[instrument(skip_all)]
async fn partner_customer_created(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let event: CustomerCreated =
        authenticate_and_decode(&state.config().partner, &headers, &body)?;

    let response = match provision_customer(&state, event).await? {
        ProvisionOutcome::Created {
            customer_id,
            codes,
            warnings,
        } => Json(json!({
            "status": "success",
            "data": {
                "customer_id": customer_id,
                "simple_forwarding_code": codes.simple,
                "signature_forwarding_code": codes.signature,
            },
            "warnings": warnings,
        })),
        ProvisionOutcome::Duplicate { .. } => Json(json!({
            "status": "ignored",
            "message": "Duplicate event",
        })),
    };

    Ok(response.into_response())
}

/// POST /webhooks/merchant/orders/paid - link a paid order to a draft order.
#[instrument(skip_all)]
async fn merchant_order_paid(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let event: MerchantOrderPaid =
        authenticate_and_decode(&state.config().merchant, &headers, &body)?;

    let outcome = link_paid_order(&state, event).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Order processed, placed on hold, and draft order created successfully",
        "draft_order_id": outcome.draft_order_id,
        "warnings": outcome.warnings,
    }))
    .into_response())
}

/// POST /webhooks/partner/orders/paid - release the hold for a paid draft.
#[instrument(skip_all)]
async fn partner_order_paid(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let event: PartnerOrderPaid =
        authenticate_and_decode(&state.config().partner, &headers, &body)?;

    let outcome = release_hold_for_paid_draft(&state, event).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Hold released successfully",
        "merchant_order_id": outcome.merchant_order_id,
    }))
    .into_response())
}
