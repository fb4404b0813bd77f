//! Fulfillment order lookup and hold/release mutations.

use serde::Deserialize;
use tracing::instrument;

use super::types::{FulfillmentOrdersEnvelope, HoldReason};
use super::{ShopifyError, StoreClient};

const HOLD_MUTATION: &str = r"
mutation FulfillmentOrderHold($fulfillmentHold: FulfillmentOrderHoldInput!, $id: ID!) {
  fulfillmentOrderHold(fulfillmentHold: $fulfillmentHold, id: $id) {
    fulfillmentOrder { id }
    userErrors { field message }
  }
}
";

const RELEASE_HOLD_MUTATION: &str = r"
mutation FulfillmentOrderReleaseHold($id: ID!) {
  fulfillmentOrderReleaseHold(id: $id) {
    fulfillmentOrder { id status }
    userErrors { field message }
  }
}
";

#[derive(Debug, Deserialize)]
struct MutationUserError {
    field: Option<Vec<String>>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct HoldResponse {
    #[serde(rename = "fulfillmentOrderHold")]
    fulfillment_order_hold: Option<MutationPayload>,
}

#[derive(Debug, Deserialize)]
struct ReleaseHoldResponse {
    #[serde(rename = "fulfillmentOrderReleaseHold")]
    fulfillment_order_release_hold: Option<MutationPayload>,
}

#[derive(Debug, Deserialize)]
struct MutationPayload {
    #[serde(rename = "userErrors", default)]
    user_errors: Vec<MutationUserError>,
}

fn check_user_errors(payload: Option<MutationPayload>) -> Result<(), ShopifyError> {
    if let Some(payload) = payload
        && !payload.user_errors.is_empty()
    {
        let messages: Vec<String> = payload
            .user_errors
            .iter()
            .map(|e| {
                let field = e.field.as_ref().map_or_else(String::new, |f| f.join("."));
                format!("{}: {}", field, e.message)
            })
            .collect();
        return Err(ShopifyError::UserError(messages.join("; ")));
    }
    Ok(())
}

fn fulfillment_order_gid(fulfillment_order_id: &str) -> String {
    format!("gid://shopify/FulfillmentOrder/{fulfillment_order_id}")
}

impl StoreClient {
    /// Resolve the first fulfillment order id for an order.
    ///
    /// Transport and HTTP errors are logged and collapsed to `None` - at
    /// this layer "not found" and "error" are deliberately indistinguishable
    /// so the workflow has exactly one miss case to gate on.
    #[instrument(skip(self), fields(store = %self.store(), order_id = %order_id))]
    pub async fn get_fulfillment_order_id(&self, order_id: &str) -> Option<String> {
        let envelope: FulfillmentOrdersEnvelope = match self
            .get(&format!("orders/{order_id}/fulfillment_orders.json"))
            .await
        {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch fulfillment orders");
                return None;
            }
        };

        let Some(first) = envelope.fulfillment_orders.first() else {
            tracing::warn!("No fulfillment orders found for order");
            return None;
        };

        tracing::info!(fulfillment_order_id = first.id, "Resolved fulfillment order");
        Some(first.id.to_string())
    }

    /// Place a hold on a fulfillment order, notifying the merchant.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the mutation reports user
    /// errors.
    #[instrument(skip(self), fields(store = %self.store(), fulfillment_order_id = %fulfillment_order_id))]
    pub async fn place_fulfillment_hold(
        &self,
        fulfillment_order_id: &str,
        reason: HoldReason,
        reason_notes: &str,
    ) -> Result<(), ShopifyError> {
        let variables = serde_json::json!({
            "fulfillmentHold": {
                "reason": reason.as_graphql(),
                "reasonNotes": reason_notes,
                "notifyMerchant": true,
            },
            "id": fulfillment_order_gid(fulfillment_order_id),
        });

        let response: HoldResponse = self.execute(HOLD_MUTATION, variables).await?;
        check_user_errors(response.fulfillment_order_hold)?;

        tracing::info!("Fulfillment hold placed");
        Ok(())
    }

    /// Release a hold on a fulfillment order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the mutation reports user
    /// errors.
    #[instrument(skip(self), fields(store = %self.store(), fulfillment_order_id = %fulfillment_order_id))]
    pub async fn release_fulfillment_hold(
        &self,
        fulfillment_order_id: &str,
    ) -> Result<(), ShopifyError> {
        let variables = serde_json::json!({
            "id": fulfillment_order_gid(fulfillment_order_id),
        });

        let response: ReleaseHoldResponse = self.execute(RELEASE_HOLD_MUTATION, variables).await?;
        check_user_errors(response.fulfillment_order_release_hold)?;

        tracing::info!("Fulfillment hold released");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fulfillment_order_gid() {
        assert_eq!(
            fulfillment_order_gid("123456"),
            "gid://shopify/FulfillmentOrder/123456"
        );
    }

    #[test]
    fn test_check_user_errors_empty_payload_ok() {
        assert!(check_user_errors(None).is_ok());
        assert!(
            check_user_errors(Some(MutationPayload {
                user_errors: vec![]
            }))
            .is_ok()
        );
    }

    #[test]
    fn test_check_user_errors_formats_field_path() {
        let payload = MutationPayload {
            user_errors: vec![MutationUserError {
                field: Some(vec!["fulfillmentHold".to_string(), "reason".to_string()]),
                message: "is invalid".to_string(),
            }],
        };
        let err = check_user_errors(Some(payload)).expect_err("user errors are errors");
        assert_eq!(
            err.to_string(),
            "User errors: fulfillmentHold.reason: is invalid"
        );
    }

    #[test]
    fn test_hold_response_parses_user_errors() {
        let json = r#"{
            "fulfillmentOrderHold": {
                "fulfillmentOrder": null,
                "userErrors": [{"field": null, "message": "Hold already exists"}]
            }
        }"#;
        let response: HoldResponse = serde_json::from_str(json).expect("deserialize");
        let err = check_user_errors(response.fulfillment_order_hold).expect_err("user error");
        assert!(err.to_string().contains("Hold already exists"));
    }
}
