//! Forwarding codes shared between the two stores.
//!
//! Every customer gets two codes: a "simple" code and a "signature" code.
//! The customer presents one of them at the merchant checkout (in the second
//! address line), and which one they used determines the forwarding product
//! they are billed for. The codes must therefore stay distinguishable from
//! each other, which the distinct prefixes guarantee.

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// Prefix for simple-forwarding codes.
pub const SIMPLE_CODE_PREFIX: &str = "pelican";

/// Prefix for signature-forwarding codes.
pub const SIGNATURE_CODE_PREFIX: &str = "pelicansig";

/// Length of the random suffix appended to each prefix.
///
/// 36^12 possible suffixes; collisions are accepted as negligible here and
/// backstopped by the unique constraints on the customer table.
pub const CODE_SUFFIX_LEN: usize = 12;

const CODE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Which of a customer's two codes matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeKind {
    /// Simple forwarding (no signature on delivery).
    SimpleCode,
    /// Signature-required forwarding.
    SignatureCode,
}

impl CodeKind {
    /// Wire name of the kind, also used as the customer metafield key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SimpleCode => "simple_code",
            Self::SignatureCode => "signature_code",
        }
    }
}

impl std::fmt::Display for CodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The pair of codes issued to a single customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardingCodes {
    /// Simple-forwarding code (`pelican...`).
    pub simple: String,
    /// Signature-forwarding code (`pelicansig...`).
    pub signature: String,
}

impl ForwardingCodes {
    /// Generate a fresh pair of codes.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            simple: generate_code(SIMPLE_CODE_PREFIX),
            signature: generate_code(SIGNATURE_CODE_PREFIX),
        }
    }

    /// Get the code for a given kind.
    #[must_use]
    pub fn get(&self, kind: CodeKind) -> &str {
        match kind {
            CodeKind::SimpleCode => &self.simple,
            CodeKind::SignatureCode => &self.signature,
        }
    }
}

/// Generate a code: `prefix` plus [`CODE_SUFFIX_LEN`] random lowercase
/// alphanumeric characters.
#[must_use]
pub fn generate_code(prefix: &str) -> String {
    let mut rng = rand::rng();
    let mut code = String::with_capacity(prefix.len() + CODE_SUFFIX_LEN);
    code.push_str(prefix);
    for _ in 0..CODE_SUFFIX_LEN {
        let byte = CODE_ALPHABET
            .choose(&mut rng)
            .expect("code alphabet is non-empty");
        code.push(char::from(*byte));
    }
    code
}
