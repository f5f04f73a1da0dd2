//! Testing utilities for the relay workspace
//!
//! Shared fixtures plus `FlakyStore`, a fault-injecting wrapper around
//! `MemoryStore` for exercising transient failures, suppressed change
//! feeds, and slow fetches that resolve out of order.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use relay_model::{
    AgentStatus, ProgressRecord, QueryDraft, QueryId, QueryStatus, ResearchQuery, ResearchResult,
};
use relay_store::{ChangeFeed, ChangeSubscription, MemoryStore, ProgressStore, StoreError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub fn create_draft(topic: &str) -> QueryDraft {
    QueryDraft::new(topic).unwrap()
}

pub fn create_progress(
    query_id: QueryId,
    agent: &str,
    status: AgentStatus,
    progress: u8,
) -> ProgressRecord {
    ProgressRecord::new(query_id, agent, status, progress)
}

pub async fn create_seeded_query(store: &(impl ProgressStore + ?Sized)) -> ResearchQuery {
    store
        .create_query(create_draft("Renewable energy trends"))
        .await
        .unwrap()
}

/// Fault-injecting store wrapper
///
/// Writes always pass straight through. Reads can be made to fail
/// transiently, the change feed can be muted (forcing the sync core
/// onto its polling fallback), and per-fetch delays let a test make an
/// earlier fetch resolve after a later one. The delay is applied after
/// the records are read, so a slow fetch returns data that was current
/// when it started, not when it finished.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_fetches: AtomicBool,
    mute_feed: AtomicBool,
    fetch_delays: Mutex<VecDeque<Duration>>,
    fetch_count: AtomicUsize,
}

impl FlakyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent fetches fail with `StoreError::Unavailable`
    pub fn set_fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Replace change-feed subscriptions with a dead channel
    pub fn set_mute_feed(&self, mute: bool) {
        self.mute_feed.store(mute, Ordering::SeqCst);
    }

    /// Queue a delay consumed by the next record fetch
    pub fn push_fetch_delay(&self, delay: Duration) {
        self.fetch_delays.lock().push_back(delay);
    }

    /// Number of fetch attempts that reached the store
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProgressStore for FlakyStore {
    async fn create_query(&self, draft: QueryDraft) -> Result<ResearchQuery, StoreError> {
        self.inner.create_query(draft).await
    }

    async fn fetch_query(&self, query_id: QueryId) -> Result<ResearchQuery, StoreError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        self.inner.fetch_query(query_id).await
    }

    async fn update_query_status(
        &self,
        query_id: QueryId,
        status: QueryStatus,
    ) -> Result<(), StoreError> {
        self.inner.update_query_status(query_id, status).await
    }

    async fn record_progress(&self, record: ProgressRecord) -> Result<(), StoreError> {
        self.inner.record_progress(record).await
    }

    async fn fetch_agent_records(
        &self,
        query_id: QueryId,
    ) -> Result<Vec<ProgressRecord>, StoreError> {
        // Read first, then stall: the caller gets a snapshot that was
        // current when the fetch started
        let records = self.inner.fetch_agent_records(query_id).await;
        let delay = self.fetch_delays.lock().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        records
    }

    async fn save_result(&self, result: ResearchResult) -> Result<(), StoreError> {
        self.inner.save_result(result).await
    }

    async fn fetch_result(&self, query_id: QueryId) -> Result<ResearchResult, StoreError> {
        self.inner.fetch_result(query_id).await
    }

    async fn delete_query(&self, query_id: QueryId) -> Result<(), StoreError> {
        self.inner.delete_query(query_id).await
    }
}

impl ChangeFeed for FlakyStore {
    fn subscribe(&self, query_id: QueryId) -> ChangeSubscription {
        if self.mute_feed.load(Ordering::SeqCst) {
            ChangeSubscription::disconnected()
        } else {
            self.inner.subscribe(query_id)
        }
    }
}
