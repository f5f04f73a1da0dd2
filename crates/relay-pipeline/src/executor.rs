//! The seam between choreography and actual research work
//!
//! The pipeline does not know how a stage does its work; it only knows
//! how to report around it. Real deployments put search and generation
//! behind this trait. The [`ScriptedExecutor`] here does no work at
//! all and exists to exercise the choreography in tests and
//! simulations.

use crate::stage::Stage;
use async_trait::async_trait;
use relay_model::ResearchQuery;
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Opaque failure from a stage's work
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct StageError(pub String);

impl StageError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Raw material for the final report, before compilation cleanup
#[derive(Debug, Clone)]
pub struct ReportDraft {
    /// Proposed title; derived from the summary when absent
    pub title: Option<String>,
    /// Executive summary
    pub summary: String,
    /// Report sections
    pub sections: Vec<Value>,
    /// Cited sources as `{ "sources": [...] }`
    pub sources: Value,
    /// Covered perspectives as `{ "perspectives": [...] }`
    pub perspectives: Value,
}

impl Default for ReportDraft {
    fn default() -> Self {
        Self {
            title: None,
            summary: "Research completed successfully".to_string(),
            sections: Vec::new(),
            sources: json!({ "sources": [] }),
            perspectives: json!({ "perspectives": [] }),
        }
    }
}

/// Performs the actual work of each research stage
#[async_trait]
pub trait StageExecutor: Send + Sync {
    /// Run one stage for the given query
    ///
    /// # Errors
    /// Returns a [`StageError`] when the stage's work fails; the
    /// pipeline then records the failure and aborts the run.
    async fn run(&self, stage: Stage, query: &ResearchQuery) -> Result<(), StageError>;

    /// Produce the final report after all stages have completed
    ///
    /// # Errors
    /// Returns a [`StageError`] when the report cannot be assembled.
    async fn report(&self, query: &ResearchQuery) -> Result<ReportDraft, StageError>;
}

/// Executor with pre-scripted outcomes
///
/// Every stage succeeds instantly unless a failure was scripted for
/// it. The report defaults to an empty-but-valid draft.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    failures: HashMap<Stage, String>,
    report: Option<ReportDraft>,
}

impl ScriptedExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script `stage` to fail with `message`
    #[must_use]
    pub fn with_failure(mut self, stage: Stage, message: impl Into<String>) -> Self {
        self.failures.insert(stage, message.into());
        self
    }

    /// Script the final report
    #[must_use]
    pub fn with_report(mut self, report: ReportDraft) -> Self {
        self.report = Some(report);
        self
    }
}

#[async_trait]
impl StageExecutor for ScriptedExecutor {
    async fn run(&self, stage: Stage, _query: &ResearchQuery) -> Result<(), StageError> {
        match self.failures.get(&stage) {
            Some(message) => Err(StageError::new(message.clone())),
            None => Ok(()),
        }
    }

    async fn report(&self, query: &ResearchQuery) -> Result<ReportDraft, StageError> {
        Ok(self.report.clone().unwrap_or_else(|| ReportDraft {
            summary: format!("Research on \"{}\" completed successfully", query.topic),
            ..ReportDraft::default()
        }))
    }
}
