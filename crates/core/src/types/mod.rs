//! Core types for Pelican Post.

pub mod code;
pub mod time;

pub use code::{
    CodeKind, ForwardingCodes, SIGNATURE_CODE_PREFIX, SIMPLE_CODE_PREFIX, generate_code,
};
pub use time::{normalize_created_at, to_naive_utc};
