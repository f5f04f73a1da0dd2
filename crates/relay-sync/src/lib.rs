//! Relay Sync - the reconciliation core
//!
//! Keeps multiple observers of a long-running research job convergent
//! with the store under two independent freshness signals:
//! - a lossy, payload-free push channel (change feed)
//! - a fixed-interval poll that guarantees eventual correctness
//!
//! Two pieces:
//! - `aggregate`: pure latest-wins projection of the progress log into
//!   one display entry per agent
//! - `Reconciler`: the owned subscription object that merges push and
//!   poll into debounced, rate-limited, generation-guarded fetches
//!
//! # Example
//!
//! ```rust,ignore
//! use relay_sync::{Reconciler, SyncConfig};
//! use std::sync::Arc;
//!
//! # async fn example(store: Arc<relay_store::MemoryStore>, id: relay_model::QueryId) {
//! let (mut reconciler, mut observer) = Reconciler::new(store, SyncConfig::default());
//! reconciler.set_query(Some(id)).await;
//!
//! observer.snapshot.changed().await.unwrap();
//! let snapshot = observer.snapshot.borrow().clone();
//! println!("{} agents reporting", snapshot.agents.len());
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod aggregate;
pub mod config;
pub mod reconciler;
pub mod snapshot;

pub use aggregate::AggregatedProgress;
pub use config::SyncConfig;
pub use reconciler::{Reconciler, SubscriptionState, SyncObserver};
pub use snapshot::{SyncEvent, SyncPhase, SyncSnapshot};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
