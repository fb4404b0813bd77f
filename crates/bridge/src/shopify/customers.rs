//! Customer fetch and metafield operations.

use pelican_core::{CodeKind, ForwardingCodes};
use tracing::instrument;

use super::types::{CustomerEnvelope, CustomerPayload, Metafield, MetafieldEnvelope, MetafieldInput};
use super::{ShopifyError, StoreClient};

impl StoreClient {
    /// Fetch a customer with their email and default address.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if the store has no such customer.
    #[instrument(skip(self), fields(store = %self.store(), customer_id = %customer_id))]
    pub async fn get_customer(&self, customer_id: &str) -> Result<CustomerPayload, ShopifyError> {
        let envelope: CustomerEnvelope = self.get(&format!("customers/{customer_id}.json")).await?;

        envelope
            .customer
            .ok_or_else(|| ShopifyError::NotFound(format!("customer {customer_id}")))
    }

    /// Write both forwarding codes onto a customer as metafields.
    ///
    /// One request per metafield; the first failure aborts, so the customer
    /// may be left with only the simple code applied. Callers treat this as
    /// best-effort and re-apply later - metafield writes are idempotent on
    /// the store side.
    ///
    /// # Errors
    ///
    /// Returns an error if any create request does not succeed.
    #[instrument(skip(self, codes), fields(store = %self.store(), customer_id = %customer_id))]
    pub async fn add_customer_metafields(
        &self,
        customer_id: &str,
        codes: &ForwardingCodes,
    ) -> Result<Vec<Metafield>, ShopifyError> {
        let path = format!("customers/{customer_id}/metafields.json");
        let mut created = Vec::with_capacity(2);

        for kind in [CodeKind::SimpleCode, CodeKind::SignatureCode] {
            let body = MetafieldEnvelope {
                metafield: MetafieldInput::text(kind.as_str(), codes.get(kind)),
            };
            let response: MetafieldEnvelope<Metafield> = self.post(&path, &body).await?;
            created.push(response.metafield);
        }

        Ok(created)
    }
}
