//! In-memory reference store
//!
//! Backing implementation for tests and the pipeline driver. Progress
//! writes append to a log; nothing is ever overwritten, matching the
//! history-keeping semantics readers must project over. Every mutation
//! pushes a payload-free notice to the query's subscribers.

use crate::error::StoreError;
use crate::feed::{ChangeFeed, ChangeNotice, ChangeSubscription, ChangedTable};
use crate::store::ProgressStore;
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use relay_model::{
    ProgressRecord, QueryDraft, QueryId, QueryStatus, ResearchQuery, ResearchResult,
};
use std::collections::HashMap;
use tokio::sync::mpsc;

#[derive(Debug, Default)]
struct Inner {
    queries: HashMap<QueryId, ResearchQuery>,
    // Append-only; index doubles as insertion order for tie-breaks
    log: Vec<ProgressRecord>,
    results: HashMap<QueryId, ResearchResult>,
}

/// In-process store with a working change feed
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    watchers: DashMap<QueryId, Vec<mpsc::UnboundedSender<ChangeNotice>>>,
}

impl MemoryStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of progress records in the log (history included)
    #[must_use]
    pub fn log_len(&self) -> usize {
        self.inner.read().log.len()
    }

    fn notify(&self, query_id: QueryId, table: ChangedTable) {
        if let Some(mut senders) = self.watchers.get_mut(&query_id) {
            senders.retain(|tx| tx.send(ChangeNotice { query_id, table }).is_ok());
        }
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn create_query(&self, draft: QueryDraft) -> Result<ResearchQuery, StoreError> {
        let query = ResearchQuery::from_draft(draft);
        self.inner.write().queries.insert(query.id, query.clone());
        self.notify(query.id, ChangedTable::ResearchQueries);
        Ok(query)
    }

    async fn fetch_query(&self, query_id: QueryId) -> Result<ResearchQuery, StoreError> {
        self.inner
            .read()
            .queries
            .get(&query_id)
            .cloned()
            .ok_or(StoreError::NotFound(query_id))
    }

    async fn update_query_status(
        &self,
        query_id: QueryId,
        status: QueryStatus,
    ) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.write();
            let query = inner
                .queries
                .get_mut(&query_id)
                .ok_or(StoreError::NotFound(query_id))?;
            if query.status.is_terminal() {
                return Err(StoreError::WriteRejected(format!(
                    "query {query_id} already completed"
                )));
            }
            query.set_status(status);
        }
        self.notify(query_id, ChangedTable::ResearchQueries);
        Ok(())
    }

    async fn record_progress(&self, record: ProgressRecord) -> Result<(), StoreError> {
        let query_id = record.query_id;
        {
            let mut inner = self.inner.write();
            if !inner.queries.contains_key(&query_id) {
                return Err(StoreError::NotFound(query_id));
            }
            inner.log.push(record);
        }
        self.notify(query_id, ChangedTable::AgentProgress);
        Ok(())
    }

    async fn fetch_agent_records(
        &self,
        query_id: QueryId,
    ) -> Result<Vec<ProgressRecord>, StoreError> {
        let inner = self.inner.read();
        let mut indexed: Vec<(usize, &ProgressRecord)> = inner
            .log
            .iter()
            .enumerate()
            .filter(|(_, r)| r.query_id == query_id)
            .collect();
        // Newest first, insertion order breaking timestamp ties
        indexed.sort_by(|(ia, a), (ib, b)| {
            (b.effective_timestamp(), ib).cmp(&(a.effective_timestamp(), ia))
        });
        Ok(indexed.into_iter().map(|(_, r)| r.clone()).collect())
    }

    async fn save_result(&self, result: ResearchResult) -> Result<(), StoreError> {
        let query_id = result.query_id;
        {
            let mut inner = self.inner.write();
            if !inner.queries.contains_key(&query_id) {
                return Err(StoreError::NotFound(query_id));
            }
            inner.results.insert(query_id, result);
        }
        self.notify(query_id, ChangedTable::ResearchQueries);
        Ok(())
    }

    async fn fetch_result(&self, query_id: QueryId) -> Result<ResearchResult, StoreError> {
        self.inner
            .read()
            .results
            .get(&query_id)
            .cloned()
            .ok_or(StoreError::NotFound(query_id))
    }

    async fn delete_query(&self, query_id: QueryId) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.write();
            if inner.queries.remove(&query_id).is_none() {
                return Err(StoreError::NotFound(query_id));
            }
            inner.log.retain(|r| r.query_id != query_id);
            inner.results.remove(&query_id);
        }
        self.notify(query_id, ChangedTable::ResearchQueries);
        self.watchers.remove(&query_id);
        Ok(())
    }
}

impl ChangeFeed for MemoryStore {
    fn subscribe(&self, query_id: QueryId) -> ChangeSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.watchers.entry(query_id).or_default().push(tx);
        tracing::debug!(%query_id, "change feed subscription opened");
        ChangeSubscription::new(rx)
    }
}
