//! Snapshots and one-shot notification events
//!
//! The presentation layer only ever reads `SyncSnapshot` values; the
//! reconciler owns the state and publishes replacements. `SyncEvent`s
//! fire at most once per actual state transition and feed one-shot UI
//! notifications.

use crate::aggregate::AggregatedProgress;
use relay_model::{ProgressRecord, QueryStatus, ResearchQuery};

/// Where the subscription stands relative to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    /// No fetch has succeeded yet
    #[default]
    Loading,
    /// State reflects the store as of the last applied fetch
    Live,
    /// The store answered definitively: no such query
    NotFound,
}

/// Point-in-time view of one query and its agents
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncSnapshot {
    /// Subscription phase
    pub phase: SyncPhase,
    /// Parent query as of the last applied fetch
    pub query: Option<ResearchQuery>,
    /// Per-agent latest state
    pub agents: AggregatedProgress,
}

impl SyncSnapshot {
    /// Agent record flagging a pipeline failure, if any
    ///
    /// Terminal for the progress display; the reconciler itself keeps
    /// polling in case the backend retries.
    #[must_use]
    pub fn pipeline_error(&self) -> Option<&ProgressRecord> {
        self.agents.first_error()
    }

    /// Whether the parent query has completed
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.query
            .as_ref()
            .is_some_and(|q| q.status == QueryStatus::Completed)
    }
}

/// One-shot notification of an observed state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The aggregated per-agent state changed
    ProgressChanged,
    /// The parent query transitioned to completed
    QueryCompleted,
    /// An agent transitioned into the error status
    PipelineError {
        /// Which agent failed
        agent_name: String,
    },
    /// The store reported the query missing
    QueryNotFound,
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_model::{AgentStatus, QueryDraft, QueryId};

    #[test]
    fn default_snapshot_is_loading() {
        let snapshot = SyncSnapshot::default();
        assert_eq!(snapshot.phase, SyncPhase::Loading);
        assert!(snapshot.query.is_none());
        assert!(!snapshot.is_completed());
    }

    #[test]
    fn completion_requires_completed_status() {
        let mut query = ResearchQuery::from_draft(QueryDraft::new("topic").unwrap());
        let mut snapshot = SyncSnapshot {
            phase: SyncPhase::Live,
            query: Some(query.clone()),
            agents: AggregatedProgress::default(),
        };
        assert!(!snapshot.is_completed());

        query.set_status(QueryStatus::Completed);
        snapshot.query = Some(query);
        assert!(snapshot.is_completed());
    }

    #[test]
    fn pipeline_error_comes_from_agents() {
        let mut rec =
            ProgressRecord::new(QueryId::new(), "Academic Research Agent", AgentStatus::Error, 0);
        rec.current_task = Some("rate limited".to_string());
        let snapshot = SyncSnapshot {
            phase: SyncPhase::Live,
            query: None,
            agents: AggregatedProgress::aggregate(&[rec]),
        };
        assert_eq!(
            snapshot.pipeline_error().unwrap().agent_name,
            "Academic Research Agent"
        );
    }
}
