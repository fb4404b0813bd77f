//! Shopify webhook signature verification.
//!
//! Shopify signs each delivery with HMAC-SHA256 over the raw request body,
//! base64-encoded into the `X-Shopify-Hmac-Sha256` header. Verification must
//! run on the exact bytes received - re-serializing the parsed JSON is not
//! guaranteed to be byte-identical - so handlers extract the body as `Bytes`
//! and only parse after this check passes.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "X-Shopify-Hmac-Sha256";

/// Verify a webhook delivery against the store's signing secret.
///
/// Returns `false` for a missing, undecodable, or mismatched signature.
/// The comparison is constant-time (via `Mac::verify_slice`).
#[must_use]
pub fn verify_webhook(raw_body: &[u8], signature_header: &str, secret: &str) -> bool {
    let Ok(signature) = BASE64.decode(signature_header.trim()) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(raw_body);

    mac.verify_slice(&signature).is_ok()
}
