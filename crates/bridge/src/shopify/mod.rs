//! Shopify Admin API clients for the two stores.
//!
//! One [`StoreClient`] is constructed per store (partner and merchant) from
//! its [`StoreConfig`](crate::config::StoreConfig). Each store exposes a
//! REST-style resource API (metafields, customers, draft orders, fulfillment
//! orders) plus one GraphQL mutation pair (fulfillment hold / release).
//!
//! # Architecture
//!
//! - REST calls go through thin `get`/`post` helpers with shared error
//!   parsing
//! - The two GraphQL mutations use string queries with typed serde response
//!   envelopes rather than schema codegen
//! - No retry logic: a single failed call terminates the enclosing workflow
//!   step, and the webhook sender's redelivery is the only retry mechanism

pub mod client;
pub mod customers;
pub mod draft_orders;
pub mod fulfillment;
pub mod types;

pub use client::StoreClient;
pub use types::{DraftOrder, HoldReason, Metafield, METAFIELD_NAMESPACE};

use thiserror::Error;

/// Errors that can occur when interacting with a store's Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// GraphQL mutation reported user errors.
    #[error("User errors: {0}")]
    UserError(String),

    /// Failed to parse a response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the store.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Unauthorized (invalid or expired access token).
    #[error("Unauthorized: invalid access token")]
    Unauthorized,
}

/// A GraphQL error returned by the Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}
