//! Service integrations outside the two stores.

pub mod notify;

pub use notify::Notifier;
