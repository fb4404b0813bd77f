//! End-to-end webhook flow tests.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The bridge running (cargo run -p pelican-bridge)
//! - Valid partner/merchant store credentials in environment
//!
//! Run with: cargo test -p pelican-integration-tests -- --ignored

use pelican_core::{SIGNATURE_CODE_PREFIX, SIMPLE_CODE_PREFIX};
use pelican_integration_tests::{
    bridge_base_url, merchant_webhook_secret, partner_webhook_secret, sign_webhook,
};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Unique-enough id per test run so reruns don't collide on the unique
/// constraints (the database persists between runs).
fn fresh_id() -> i64 {
    i64::try_from(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time after epoch")
            .as_millis()
            % 1_000_000_000_000,
    )
    .expect("fits in i64")
}

/// POST a partner webhook with a valid signature (when configured).
async fn post_partner_webhook(client: &Client, path: &str, payload: &Value) -> reqwest::Response {
    let body = serde_json::to_vec(payload).expect("serialize payload");
    let mut request = client
        .post(format!("{}{path}", bridge_base_url()))
        .header("Content-Type", "application/json")
        .body(body.clone());

    if let Some(secret) = partner_webhook_secret() {
        request = request.header("X-Shopify-Hmac-Sha256", sign_webhook(&body, &secret));
    }

    request.send().await.expect("request sends")
}

/// POST a merchant webhook with a valid signature (when configured).
async fn post_merchant_webhook(client: &Client, payload: &Value) -> reqwest::Response {
    let body = serde_json::to_vec(payload).expect("serialize payload");
    let mut request = client
        .post(format!("{}/webhooks/merchant/orders/paid", bridge_base_url()))
        .header("Content-Type", "application/json")
        .body(body.clone());

    if let Some(secret) = merchant_webhook_secret() {
        request = request.header("X-Shopify-Hmac-Sha256", sign_webhook(&body, &secret));
    }

    request.send().await.expect("request sends")
}

/// Provision a test customer and return (customer_id, simple, signature).
async fn provision_customer(client: &Client, customer_id: i64) -> (String, String, String) {
    let payload = json!({
        "id": customer_id,
        "first_name": "Ana",
        "email": "ana@example.com",
        "default_address": {
            "address1": "1 Main",
            "city": "X",
            "province": "Y",
            "country": "Z",
            "zip": "0"
        }
    });

    let resp = post_partner_webhook(client, "/webhooks/partner/customers/enable", &payload).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["status"], "success");

    (
        body["data"]["customer_id"]
            .as_str()
            .expect("customer_id")
            .to_string(),
        body["data"]["simple_forwarding_code"]
            .as_str()
            .expect("simple code")
            .to_string(),
        body["data"]["signature_forwarding_code"]
            .as_str()
            .expect("signature code")
            .to_string(),
    )
}

// ============================================================================
// Customer provisioning
// ============================================================================

#[tokio::test]
#[ignore = "Requires running bridge, database, and store credentials"]
async fn test_customer_provisioning_issues_distinct_codes() {
    let client = Client::new();
    let customer_id = fresh_id();

    let (id, simple, signature) = provision_customer(&client, customer_id).await;

    assert_eq!(id, customer_id.to_string());
    assert!(simple.starts_with(SIMPLE_CODE_PREFIX));
    assert!(signature.starts_with(SIGNATURE_CODE_PREFIX));
    assert_ne!(simple, signature);
}

#[tokio::test]
#[ignore = "Requires running bridge, database, and store credentials"]
async fn test_duplicate_customer_delivery_is_ignored() {
    let client = Client::new();
    let customer_id = fresh_id();

    let _ = provision_customer(&client, customer_id).await;

    // Redelivery of the same event must not create a second record.
    let payload = json!({ "id": customer_id, "first_name": "Ana" });
    let resp = post_partner_webhook(&client, "/webhooks/partner/customers/enable", &payload).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["status"], "ignored");
    assert_eq!(body["message"], "Duplicate event");
}

#[tokio::test]
#[ignore = "Requires running bridge with a partner webhook secret configured"]
async fn test_bad_signature_is_rejected() {
    let client = Client::new();
    assert!(
        partner_webhook_secret().is_some(),
        "set PARTNER_WEBHOOK_SECRET to run this test"
    );

    let body = serde_json::to_vec(&json!({ "id": fresh_id() })).expect("serialize");
    let resp = client
        .post(format!(
            "{}/webhooks/partner/customers/enable",
            bridge_base_url()
        ))
        .header("Content-Type", "application/json")
        .header("X-Shopify-Hmac-Sha256", sign_webhook(&body, "wrong-secret"))
        .body(body)
        .send()
        .await
        .expect("request sends");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["status"], "failure");
    assert_eq!(body["message"], "Invalid signature");
}

// ============================================================================
// Order linking
// ============================================================================

#[tokio::test]
#[ignore = "Requires running bridge, database, and store credentials"]
async fn test_order_paid_without_code_is_rejected() {
    let client = Client::new();

    let resp = post_merchant_webhook(&client, &json!({ "id": fresh_id() })).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["status"], "failure");
    assert_eq!(
        body["message"],
        "Address2 (validation code) is required in shipping_address"
    );
}

#[tokio::test]
#[ignore = "Requires running bridge, database, and store credentials"]
async fn test_order_paid_with_unknown_code_is_rejected() {
    let client = Client::new();
    let unknown_code = "pelicanzzzzzzzzzzzz";

    let resp = post_merchant_webhook(
        &client,
        &json!({
            "id": fresh_id(),
            "shipping_address": { "address2": unknown_code }
        }),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["status"], "failure");
    assert_eq!(
        body["message"],
        format!("Invalid validation code: {unknown_code}")
    );
}

#[tokio::test]
#[ignore = "Requires running bridge, database, store credentials, and a holdable merchant order"]
async fn test_order_paid_links_and_replay_conflicts() {
    let client = Client::new();
    let (_, simple, _) = provision_customer(&client, fresh_id()).await;

    // MERCHANT_TEST_ORDER_ID must name a real, unfulfilled merchant order so
    // the hold and draft-order steps can succeed against the live stores.
    let order_id: i64 = std::env::var("MERCHANT_TEST_ORDER_ID")
        .expect("set MERCHANT_TEST_ORDER_ID to run this test")
        .parse()
        .expect("valid order id");

    let payload = json!({
        "id": order_id,
        "order_number": 1042,
        "shipping_address": { "address2": simple },
        "created_at": "2024-03-01T10:00:00-05:00"
    });

    let resp = post_merchant_webhook(&client, &payload).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["status"], "success");
    assert!(body["draft_order_id"].as_str().is_some());

    // Replaying the exact same delivery must hit the duplicate gate and
    // create no second correlation or draft order.
    let replay = post_merchant_webhook(&client, &payload).await;
    assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
    let replay_body: Value = replay.json().await.expect("json body");
    assert_eq!(replay_body["status"], "failure");
    assert_eq!(
        replay_body["message"],
        format!("Draft order already exists for this merchant order ID: {order_id}")
    );
}

#[tokio::test]
#[ignore = "Requires running bridge, database, store credentials, and a holdable merchant order"]
async fn test_signature_code_selects_signature_variant() {
    let client = Client::new();
    let (_, _, signature) = provision_customer(&client, fresh_id()).await;

    let order_id: i64 = std::env::var("MERCHANT_TEST_ORDER_ID")
        .expect("set MERCHANT_TEST_ORDER_ID to run this test")
        .parse()
        .expect("valid order id");

    let resp = post_merchant_webhook(
        &client,
        &json!({
            "id": order_id,
            "shipping_address": { "address2": signature }
        }),
    )
    .await;

    // The draft order's line item carries SIGNATURE_VARIANT_ID; confirming
    // that requires inspecting the partner store, so this test asserts the
    // workflow accepted the signature code end-to-end.
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["status"], "success");
}
