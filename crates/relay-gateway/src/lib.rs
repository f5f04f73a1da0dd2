//! Relay Gateway - job-trigger boundary
//!
//! Thin HTTP client for the one call that leaves this system: asking the
//! backend to start a research workflow for an already-persisted query.
//! The call is fire-and-forget on the backend side; everything after it
//! is observed through the store, not through this client.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod client;
pub mod error;

pub use client::{TriggerClient, TriggerReceipt};
pub use error::TriggerError;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
