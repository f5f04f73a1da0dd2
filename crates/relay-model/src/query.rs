//! Research queries - one per user submission

use crate::draft::{QueryDraft, ReportFormat, ResearchDepth};
use crate::ids::QueryId;
use crate::status::QueryStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single user-submitted research request
///
/// Created on submission, mutated by the backend pipeline as it advances,
/// immutable once completed except for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchQuery {
    /// Unique identifier
    pub id: QueryId,
    /// Main topic or question
    pub topic: String,
    /// Desired depth
    pub depth: ResearchDepth,
    /// Viewpoints to consider
    pub perspectives: Vec<String>,
    /// Report output format
    pub format: ReportFormat,
    /// Preferred source types
    pub sources: Vec<String>,
    /// Historical time frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    /// Current pipeline status
    pub status: QueryStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl ResearchQuery {
    /// Materialize a draft into a fresh query with status `initializing`
    #[must_use]
    pub fn from_draft(draft: QueryDraft) -> Self {
        let now = Utc::now();
        Self {
            id: QueryId::new(),
            topic: draft.topic,
            depth: draft.depth,
            perspectives: draft.perspectives,
            format: draft.format,
            sources: draft.sources,
            timeframe: draft.timeframe,
            status: QueryStatus::Initializing,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a status transition, bumping `updated_at`
    pub fn set_status(&mut self, status: QueryStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}
