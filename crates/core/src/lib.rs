//! Pelican Post Core - Shared types library.
//!
//! This crate provides common types used across all Pelican Post components:
//! - `bridge` - Webhook service linking the partner and merchant stores
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Forwarding-code kinds and generation, timestamp normalization

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
