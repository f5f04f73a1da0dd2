//! Relay Store - job store and change feed client contracts
//!
//! The reconciliation core never talks to a concrete backend; it depends
//! on the two seams defined here:
//! - `ProgressStore`: authoritative reads/writes for queries, progress
//!   records, and results
//! - `ChangeFeed`: payload-free row-change notifications (pure
//!   "invalidate" signals; the caller must always re-fetch)
//!
//! `MemoryStore` is the in-process reference implementation used by the
//! pipeline driver and the test suites.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod feed;
pub mod memory;
pub mod store;

pub use error::StoreError;
pub use feed::{ChangeFeed, ChangeNotice, ChangeSubscription, ChangedTable};
pub use memory::MemoryStore;
pub use store::ProgressStore;

#[cfg(feature = "mocks")]
pub use store::MockProgressStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
