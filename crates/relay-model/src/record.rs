//! Progress records - the append/update log written by the pipeline
//!
//! The store keeps every progress update; superseded records remain as
//! history, so readers must always project to "most recent per agent".

use crate::ids::{QueryId, RecordId};
use crate::status::AgentStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single progress update from one pipeline agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Record identifier, unique across the log
    pub id: RecordId,
    /// Query this record belongs to
    pub query_id: QueryId,
    /// Pipeline stage that produced the record (e.g. "Web Research Agent")
    pub agent_name: String,
    /// Agent state at the time of the update
    pub status: AgentStatus,
    /// Completion percentage, clamped to 0-100
    pub progress: u8,
    /// Free-text description of the current task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_task: Option<String>,
    /// Update timestamp; a missing timestamp ranks below any real one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProgressRecord {
    /// Create a new record stamped with the current time
    #[must_use]
    pub fn new(
        query_id: QueryId,
        agent_name: impl Into<String>,
        status: AgentStatus,
        progress: u8,
    ) -> Self {
        Self {
            id: RecordId::new(),
            query_id,
            agent_name: agent_name.into(),
            status,
            progress: progress.min(100),
            current_task: None,
            updated_at: Some(Utc::now()),
        }
    }

    /// With a task description
    #[inline]
    #[must_use]
    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.current_task = Some(task.into());
        self
    }

    /// With an explicit timestamp
    #[inline]
    #[must_use]
    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = Some(at);
        self
    }

    /// Timestamp used for latest-wins comparisons; epoch when missing
    #[inline]
    #[must_use]
    pub fn effective_timestamp(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}
