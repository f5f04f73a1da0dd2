//! The `ProgressStore` contract

use crate::error::StoreError;
use async_trait::async_trait;
use relay_model::{
    ProgressRecord, QueryDraft, QueryId, QueryStatus, ResearchQuery, ResearchResult,
};

/// Authoritative persistence boundary for research queries
///
/// Progress writes are appends: the store keeps every update as history
/// and readers project to "latest per agent". Reads of the progress log
/// return records ordered by `updated_at` descending, insertion order
/// breaking ties.
#[cfg_attr(feature = "mocks", mockall::automock)]
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Materialize a validated draft into a stored query
    ///
    /// # Errors
    /// - `StoreError::Unavailable` on backend failure
    async fn create_query(&self, draft: QueryDraft) -> Result<ResearchQuery, StoreError>;

    /// Fetch one query by id
    ///
    /// # Errors
    /// - `StoreError::NotFound` if no matching row exists
    /// - `StoreError::Unavailable` on backend failure
    async fn fetch_query(&self, query_id: QueryId) -> Result<ResearchQuery, StoreError>;

    /// Advance the query status
    ///
    /// # Errors
    /// - `StoreError::NotFound` if the query does not exist
    /// - `StoreError::WriteRejected` if the query already completed
    async fn update_query_status(
        &self,
        query_id: QueryId,
        status: QueryStatus,
    ) -> Result<(), StoreError>;

    /// Append one progress record to the log
    ///
    /// # Errors
    /// - `StoreError::NotFound` if the parent query does not exist
    async fn record_progress(&self, record: ProgressRecord) -> Result<(), StoreError>;

    /// All progress records for a query, newest first
    ///
    /// # Errors
    /// - `StoreError::Unavailable` on backend failure
    async fn fetch_agent_records(
        &self,
        query_id: QueryId,
    ) -> Result<Vec<ProgressRecord>, StoreError>;

    /// Persist the final compiled result
    ///
    /// # Errors
    /// - `StoreError::NotFound` if the parent query does not exist
    async fn save_result(&self, result: ResearchResult) -> Result<(), StoreError>;

    /// Fetch the final result, if the query has one
    ///
    /// # Errors
    /// - `StoreError::NotFound` if no result has been saved yet
    async fn fetch_result(&self, query_id: QueryId) -> Result<ResearchResult, StoreError>;

    /// Remove a query and everything attached to it
    ///
    /// # Errors
    /// - `StoreError::NotFound` if the query does not exist
    async fn delete_query(&self, query_id: QueryId) -> Result<(), StoreError>;
}
