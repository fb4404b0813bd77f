//! Draft order creation and order metafield operations.

use tracing::instrument;

use super::types::{
    DraftOrder, DraftOrderCreateEnvelope, DraftOrderEnvelope, DraftOrderInput, DraftOrderLineItem,
    Metafield, MetafieldEnvelope, MetafieldInput, MetafieldsEnvelope, ShippingAddress,
};
use super::{ShopifyError, StoreClient};

impl StoreClient {
    /// Create an open draft order for the customer with a single line item.
    ///
    /// Two-step: the customer is fetched first so the draft order carries
    /// their email and default shipping address. The incoming address2 is
    /// stripped because that field is where forwarding codes travel.
    ///
    /// # Errors
    ///
    /// Returns an error if the customer cannot be fetched, has no default
    /// address, or the create request does not succeed.
    #[instrument(skip(self), fields(store = %self.store(), customer_id = %customer_id, variant_id))]
    pub async fn create_draft_order(
        &self,
        customer_id: &str,
        variant_id: i64,
    ) -> Result<DraftOrder, ShopifyError> {
        let customer = self.get_customer(customer_id).await?;

        let address = customer.default_address.ok_or_else(|| {
            ShopifyError::NotFound(format!("default address for customer {customer_id}"))
        })?;

        let body = DraftOrderCreateEnvelope {
            draft_order: DraftOrderInput {
                customer_id: customer.id,
                email: customer.email.unwrap_or_default(),
                first_name: address.first_name.clone().unwrap_or_default(),
                last_name: address.last_name.clone().unwrap_or_default(),
                line_items: vec![DraftOrderLineItem {
                    variant_id,
                    quantity: 1,
                }],
                status: "open".to_string(),
                shipping_address: ShippingAddress {
                    address1: address.address1.unwrap_or_default(),
                    address2: address.address2.unwrap_or_default().trim().to_string(),
                    city: address.city.unwrap_or_default(),
                    province: address.province.unwrap_or_default(),
                    country: address.country.unwrap_or_default(),
                    zip: address.zip.unwrap_or_default(),
                },
            },
        };

        let envelope: DraftOrderEnvelope = self.post("draft_orders.json", &body).await?;
        tracing::info!(draft_order_id = envelope.draft_order.id, "Draft order created");

        Ok(envelope.draft_order)
    }

    /// Write a metafield onto a draft order.
    ///
    /// # Errors
    ///
    /// Returns an error if the create request does not succeed.
    #[instrument(skip(self, value), fields(store = %self.store(), draft_order_id = %draft_order_id, key = %key))]
    pub async fn add_draft_order_metafield(
        &self,
        draft_order_id: &str,
        namespace: &str,
        key: &str,
        value: &str,
    ) -> Result<Metafield, ShopifyError> {
        let body = MetafieldEnvelope {
            metafield: MetafieldInput {
                namespace: namespace.to_string(),
                key: key.to_string(),
                value: value.to_string(),
                value_type: super::types::SINGLE_LINE_TEXT.to_string(),
            },
        };

        let response: MetafieldEnvelope<Metafield> = self
            .post(&format!("draft_orders/{draft_order_id}/metafields.json"), &body)
            .await?;

        Ok(response.metafield)
    }

    /// Fetch all metafields attached to an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request does not succeed.
    #[instrument(skip(self), fields(store = %self.store(), order_id = %order_id))]
    pub async fn get_order_metafields(
        &self,
        order_id: &str,
    ) -> Result<Vec<Metafield>, ShopifyError> {
        let envelope: MetafieldsEnvelope = self
            .get(&format!("orders/{order_id}/metafields.json"))
            .await?;

        Ok(envelope.metafields)
    }
}
