//! Customer provisioning: partner "customer created" → forwarding codes.

use pelican_core::ForwardingCodes;
use serde::Deserialize;
use tracing::instrument;

use crate::db::{self, NewCustomer};
use crate::error::AppError;
use crate::state::AppState;

/// Decoded partner "customer created" webhook payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerCreated {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub default_address: Option<CustomerCreatedAddress>,
}

/// Address block of the customer payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerCreatedAddress {
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
}

/// Terminal outcome of a provisioning run.
#[derive(Debug)]
pub enum ProvisionOutcome {
    /// Customer persisted; codes issued.
    Created {
        /// Partner-store customer id.
        customer_id: String,
        /// The issued code pair.
        codes: ForwardingCodes,
        /// Side-channel failures that did not fail the run.
        warnings: Vec<String>,
    },
    /// This delivery was already processed; nothing was written.
    Duplicate {
        /// Partner-store customer id.
        customer_id: String,
    },
}

/// Process a "customer created" event end-to-end.
///
/// Metafield propagation and the backend notification are best-effort: the
/// customer record is the source of truth, and a caller can receive a
/// successful outcome whose `warnings` show that propagation failed.
///
/// # Errors
///
/// Returns error only when the customer record cannot be persisted.
#[instrument(skip(state, event), fields(partner_customer_id = event.id))]
pub async fn provision_customer(
    state: &AppState,
    event: CustomerCreated,
) -> Result<ProvisionOutcome, AppError> {
    let partner_customer_id = event.id.to_string();

    // Fast-path dedup; the unique constraint below is the durable guard.
    if state.dedup().check_and_insert(&partner_customer_id).await {
        tracing::info!("Duplicate customer-created delivery ignored");
        return Ok(ProvisionOutcome::Duplicate {
            customer_id: partner_customer_id,
        });
    }

    let codes = ForwardingCodes::generate();
    let mut warnings = Vec::new();

    // First metafield pass with the freshly generated codes. Not fatal: the
    // record below is authoritative and the codes are re-applied from it.
    if let Err(e) = state
        .partner()
        .add_customer_metafields(&partner_customer_id, &codes)
        .await
    {
        tracing::error!(error = %e, "Failed to add customer metafields");
        warnings.push(format!("Failed to add customer metafields: {e}"));
    }

    let display_name = event.first_name.unwrap_or_else(|| "Unknown".to_string());
    let address = event.default_address.unwrap_or_default();
    let address2 = address
        .address2
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty());

    let new_customer = NewCustomer {
        partner_customer_id: partner_customer_id.clone(),
        display_name: display_name.clone(),
        simple_code: codes.simple.clone(),
        signature_code: codes.signature.clone(),
        email: event.email.unwrap_or_default(),
        address1: address.address1.unwrap_or_default(),
        address2,
        city: address.city.unwrap_or_default(),
        province: address.province.unwrap_or_default(),
        country: address.country.unwrap_or_default(),
        zip: address.zip.unwrap_or_default(),
    };

    let Some(customer) = db::customers::insert_customer(state.pool(), new_customer).await? else {
        // Lost to an earlier delivery (other instance, or before a restart).
        tracing::info!("Customer already provisioned");
        return Ok(ProvisionOutcome::Duplicate {
            customer_id: partner_customer_id,
        });
    };

    // Re-apply metafields from the persisted row. Idempotent on the store
    // side, and covers the case where the first pass only half-applied.
    let persisted_codes = ForwardingCodes {
        simple: customer.simple_code.clone(),
        signature: customer.signature_code.clone(),
    };
    if let Err(e) = state
        .partner()
        .add_customer_metafields(&customer.partner_customer_id, &persisted_codes)
        .await
    {
        tracing::error!(error = %e, "Failed to re-apply customer metafields");
        warnings.push(format!("Failed to re-apply customer metafields: {e}"));
    }

    if let Err(e) = state
        .notifier()
        .codes_issued(&display_name, &persisted_codes)
        .await
    {
        tracing::error!(error = %e, "Failed to notify backend app");
        warnings.push(format!("Failed to notify backend app: {e}"));
    }

    tracing::info!(customer_id = %customer.partner_customer_id, "Customer provisioned");

    Ok(ProvisionOutcome::Created {
        customer_id: customer.partner_customer_id,
        codes: persisted_codes,
        warnings,
    })
}
