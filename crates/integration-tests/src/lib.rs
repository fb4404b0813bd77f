//! Integration tests for Pelican Post.
//!
//! # Running Tests
//!
//! The tests drive a running bridge end-to-end, so they are `#[ignore]`d by
//! default and require:
//!
//! - A running `PostgreSQL` database with migrations applied
//!   (`cargo run -p pelican-cli -- migrate bridge`)
//! - The bridge running (`cargo run -p pelican-bridge`)
//! - Valid partner/merchant store credentials in the environment
//!
//! ```bash
//! cargo test -p pelican-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `webhook_flows` - Provisioning, linking, and release webhooks
//! - `validate_code` - The public code-validation API

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Base URL for the bridge (configurable via environment).
#[must_use]
pub fn bridge_base_url() -> String {
    std::env::var("BRIDGE_BASE_URL").unwrap_or_else(|_| "http://localhost:3002".to_string())
}

/// Compute the webhook signature header Shopify would send for a body.
#[must_use]
pub fn sign_webhook(body: &[u8], secret: &str) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(body);
    BASE64.encode(mac.finalize().into_bytes())
}

/// The partner webhook secret used by the running bridge, if configured.
#[must_use]
pub fn partner_webhook_secret() -> Option<String> {
    std::env::var("PARTNER_WEBHOOK_SECRET").ok()
}

/// The merchant webhook secret used by the running bridge, if configured.
#[must_use]
pub fn merchant_webhook_secret() -> Option<String> {
    std::env::var("MERCHANT_WEBHOOK_SECRET").ok()
}
