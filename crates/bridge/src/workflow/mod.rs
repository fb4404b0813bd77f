//! The order-linking workflows.
//!
//! Three state machines, one per webhook direction:
//!
//! - [`provision`] - partner "customer created" → code pair + metafields +
//!   customer record
//! - [`link`] - merchant "order paid" → code validation → fulfillment hold →
//!   draft order → persisted correlation → backlink metafield
//! - [`release`] - partner "order paid" (the forwarding fee got paid) →
//!   correlation lookup → hold release
//!
//! Critical-path failures abort the workflow immediately with a terminal
//! [`AppError`](crate::error::AppError); there are no retries and no
//! compensation - the webhook sender's redelivery plus the idempotency
//! guards in the persistence layer are the recovery mechanism. Side-channel
//! failures (metafield propagation, backend notification) never fail a run:
//! they are collected into the outcome's `warnings` so operators and tests
//! can observe degraded-but-successful runs.

pub mod link;
pub mod provision;
pub mod release;

use pelican_core::CodeKind;
use sqlx::PgPool;

pub use link::{LinkOutcome, MerchantOrderPaid, link_paid_order};
pub use provision::{CustomerCreated, ProvisionOutcome, provision_customer};
pub use release::{PartnerOrderPaid, ReleaseOutcome, release_hold_for_paid_draft};

use crate::db;
use crate::error::AppError;

/// A successful code validation: which code kind matched and for whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeValidation {
    /// Which of the customer's codes matched.
    pub match_type: CodeKind,
    /// The owning customer's partner-store id.
    pub customer_id: String,
}

/// Validate a presented code against persisted customers.
///
/// Matches either the simple or the signature code; returns `None` for a
/// code that matches no customer (including the empty string, which can
/// never match a persisted code).
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn validate_code(
    pool: &PgPool,
    code: &str,
) -> Result<Option<CodeValidation>, AppError> {
    let Some(customer) = db::customers::find_customer_by_code(pool, code).await? else {
        return Ok(None);
    };

    // The row was found by code equality, so one of the kinds must match.
    let Some(match_type) = customer.code_kind(code) else {
        return Ok(None);
    };

    Ok(Some(CodeValidation {
        match_type,
        customer_id: customer.partner_customer_id,
    }))
}
