//! Request and response payload types for the Admin REST API.

use serde::{Deserialize, Serialize};

/// Metafield namespace owned by the bridge on the partner store.
pub const METAFIELD_NAMESPACE: &str = "pelican";

/// Shopify metafield type for plain string values.
pub const SINGLE_LINE_TEXT: &str = "single_line_text_field";

/// A metafield as returned by the REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct Metafield {
    pub id: i64,
    pub namespace: String,
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub value_type: Option<String>,
}

/// A metafield create payload.
#[derive(Debug, Clone, Serialize)]
pub struct MetafieldInput {
    pub namespace: String,
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub value_type: String,
}

impl MetafieldInput {
    /// A `single_line_text_field` metafield in the bridge namespace.
    #[must_use]
    pub fn text(key: &str, value: &str) -> Self {
        Self {
            namespace: METAFIELD_NAMESPACE.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            value_type: SINGLE_LINE_TEXT.to_string(),
        }
    }
}

/// REST envelope for a single metafield.
#[derive(Debug, Serialize, Deserialize)]
pub struct MetafieldEnvelope<T> {
    pub metafield: T,
}

/// REST envelope for a metafield list.
#[derive(Debug, Deserialize)]
pub struct MetafieldsEnvelope {
    pub metafields: Vec<Metafield>,
}

/// A customer as returned by `GET /customers/{id}.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerPayload {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub default_address: Option<CustomerAddress>,
}

/// A customer address from the REST API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerAddress {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
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

#[derive(Debug, Deserialize)]
pub struct CustomerEnvelope {
    #[serde(default)]
    pub customer: Option<CustomerPayload>,
}

/// A draft order as returned by the REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct DraftOrder {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DraftOrderEnvelope {
    pub draft_order: DraftOrder,
}

/// Draft order create payload.
#[derive(Debug, Serialize)]
pub struct DraftOrderInput {
    pub customer_id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub line_items: Vec<DraftOrderLineItem>,
    pub status: String,
    pub shipping_address: ShippingAddress,
}

#[derive(Debug, Serialize)]
pub struct DraftOrderLineItem {
    pub variant_id: i64,
    pub quantity: u32,
}

#[derive(Debug, Default, Serialize)]
pub struct ShippingAddress {
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub province: String,
    pub country: String,
    pub zip: String,
}

#[derive(Debug, Serialize)]
pub struct DraftOrderCreateEnvelope {
    pub draft_order: DraftOrderInput,
}

/// A fulfillment order as returned by
/// `GET /orders/{id}/fulfillment_orders.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct FulfillmentOrder {
    pub id: i64,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FulfillmentOrdersEnvelope {
    #[serde(default)]
    pub fulfillment_orders: Vec<FulfillmentOrder>,
}

/// Reason attached to a fulfillment hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldReason {
    AwaitingPayment,
    HighRiskOfFraud,
    IncorrectAddress,
    InventoryOutOfStock,
    Other,
}

impl HoldReason {
    /// The Admin API enum value for this reason.
    #[must_use]
    pub const fn as_graphql(self) -> &'static str {
        match self {
            Self::AwaitingPayment => "AWAITING_PAYMENT",
            Self::HighRiskOfFraud => "HIGH_RISK_OF_FRAUD",
            Self::IncorrectAddress => "INCORRECT_ADDRESS",
            Self::InventoryOutOfStock => "INVENTORY_OUT_OF_STOCK",
            Self::Other => "OTHER",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metafield_input_text() {
        let input = MetafieldInput::text("simple_code", "pelicanabc123");
        assert_eq!(input.namespace, METAFIELD_NAMESPACE);
        assert_eq!(input.key, "simple_code");
        assert_eq!(input.value, "pelicanabc123");
        assert_eq!(input.value_type, SINGLE_LINE_TEXT);
    }

    #[test]
    fn test_metafield_input_serializes_type_field() {
        let input = MetafieldInput::text("signature_code", "pelicansigxyz");
        let json = serde_json::to_value(&input).expect("serialize");
        assert_eq!(json["type"], SINGLE_LINE_TEXT);
    }

    #[test]
    fn test_fulfillment_orders_envelope_tolerates_empty() {
        let envelope: FulfillmentOrdersEnvelope =
            serde_json::from_str("{}").expect("deserialize");
        assert!(envelope.fulfillment_orders.is_empty());
    }

    #[test]
    fn test_hold_reason_graphql_values() {
        assert_eq!(HoldReason::Other.as_graphql(), "OTHER");
        assert_eq!(HoldReason::AwaitingPayment.as_graphql(), "AWAITING_PAYMENT");
    }

    #[test]
    fn test_customer_envelope_missing_customer() {
        let envelope: CustomerEnvelope = serde_json::from_str("{}").expect("deserialize");
        assert!(envelope.customer.is_none());
    }
}
