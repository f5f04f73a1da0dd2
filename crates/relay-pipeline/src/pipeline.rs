//! Workflow driver
//!
//! Owns the choreography of one research run: seed the agent roster so
//! observers immediately see every stage as waiting, advance the query
//! status as stages are entered, and translate stage outcomes into
//! progress records. A failed stage leaves its error record in the log
//! and resets the query to waiting so it can be retried; it never
//! erases what earlier stages reported.

use crate::error::PipelineError;
use crate::executor::StageExecutor;
use crate::stage::Stage;
use relay_model::{AgentStatus, ProgressRecord, QueryId, QueryStatus, ResearchQuery, ResearchResult};
use relay_store::ProgressStore;
use std::sync::Arc;

/// Initial roster entries, written before any stage starts
const AGENT_ROSTER: [(&str, &str); 5] = [
    ("Web Research Agent", "Preparing to start web research"),
    ("Editor Agent", "Waiting to create research outline"),
    ("Academic Research Agent", "Waiting to conduct in-depth research"),
    ("Fact Checker Agent", "Waiting to review and fact-check content"),
    ("Synthesis Agent", "Waiting to compile final report"),
];

/// Drives queries through the staged research workflow
pub struct ResearchPipeline<S, E> {
    store: Arc<S>,
    executor: E,
}

impl<S, E> ResearchPipeline<S, E>
where
    S: ProgressStore,
    E: StageExecutor,
{
    #[must_use]
    pub fn new(store: Arc<S>, executor: E) -> Self {
        Self { store, executor }
    }

    /// Run the full workflow for one query
    ///
    /// # Errors
    /// Returns the first failure; by then the query status has been
    /// reset to waiting and, for stage failures, the agent's error
    /// record is in the log.
    pub async fn execute(&self, query_id: QueryId) -> Result<(), PipelineError> {
        let query = self.store.fetch_query(query_id).await?;
        tracing::info!(%query_id, topic = %query.topic, "starting research workflow");

        match self.run(&query).await {
            Ok(()) => {
                self.store
                    .update_query_status(query_id, QueryStatus::Completed)
                    .await?;
                tracing::info!(%query_id, "research workflow completed");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%query_id, error = %err, "research workflow failed");
                if let Err(reset_err) = self
                    .store
                    .update_query_status(query_id, QueryStatus::Waiting)
                    .await
                {
                    tracing::warn!(%query_id, error = %reset_err, "failed to reset query to waiting");
                }
                Err(err)
            }
        }
    }

    async fn run(&self, query: &ResearchQuery) -> Result<(), PipelineError> {
        self.seed_roster(query.id).await?;
        self.store
            .update_query_status(query.id, QueryStatus::Initializing)
            .await?;
        for stage in Stage::ALL {
            self.run_stage(stage, query).await?;
        }
        self.publish(query).await
    }

    /// Write every agent as waiting so observers see the whole roster
    /// before the first stage reports
    async fn seed_roster(&self, query_id: QueryId) -> Result<(), PipelineError> {
        for (agent, message) in AGENT_ROSTER {
            self.store
                .record_progress(
                    ProgressRecord::new(query_id, agent, AgentStatus::Waiting, 0)
                        .with_task(message),
                )
                .await?;
        }
        Ok(())
    }

    async fn run_stage(&self, stage: Stage, query: &ResearchQuery) -> Result<(), PipelineError> {
        if let Some(status) = stage.query_status() {
            self.store.update_query_status(query.id, status).await?;
        }
        self.store
            .record_progress(
                ProgressRecord::new(
                    query.id,
                    stage.agent_name(),
                    AgentStatus::Active,
                    stage.active_progress(),
                )
                .with_task(stage.active_task()),
            )
            .await?;
        tracing::debug!(query_id = %query.id, agent = stage.agent_name(), "stage started");

        match self.executor.run(stage, query).await {
            Ok(()) => {
                self.store
                    .record_progress(
                        ProgressRecord::new(
                            query.id,
                            stage.agent_name(),
                            AgentStatus::Completed,
                            100,
                        )
                        .with_task(stage.completed_task()),
                    )
                    .await?;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    query_id = %query.id,
                    agent = stage.agent_name(),
                    error = %err,
                    "stage failed"
                );
                self.store
                    .record_progress(
                        ProgressRecord::new(query.id, stage.agent_name(), AgentStatus::Error, 0)
                            .with_task(stage.failed_task()),
                    )
                    .await?;
                Err(PipelineError::StageFailed {
                    stage,
                    message: err.to_string(),
                })
            }
        }
    }

    async fn publish(&self, query: &ResearchQuery) -> Result<(), PipelineError> {
        let draft = self
            .executor
            .report(query)
            .await
            .map_err(|err| PipelineError::PublicationFailed(err.to_string()))?;
        let result = ResearchResult::compile(
            query.id,
            draft.title,
            draft.summary,
            draft.sections,
            draft.sources,
            draft.perspectives,
        );
        self.store.save_result(result).await?;
        tracing::debug!(query_id = %query.id, "final report saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ScriptedExecutor;
    use relay_model::QueryDraft;
    use relay_store::{MemoryStore, MockProgressStore, StoreError};

    async fn seeded(store: &MemoryStore) -> ResearchQuery {
        store
            .create_query(QueryDraft::new("Renewable energy trends").unwrap())
            .await
            .unwrap()
    }

    fn latest_for<'a>(records: &'a [ProgressRecord], agent: &str) -> &'a ProgressRecord {
        // Records come back newest first
        records
            .iter()
            .find(|r| r.agent_name == agent)
            .expect("agent missing from log")
    }

    #[tokio::test]
    async fn happy_path_completes_query_and_saves_result() {
        let store = Arc::new(MemoryStore::new());
        let query = seeded(&store).await;
        let pipeline = ResearchPipeline::new(Arc::clone(&store), ScriptedExecutor::new());

        pipeline.execute(query.id).await.unwrap();

        let done = store.fetch_query(query.id).await.unwrap();
        assert_eq!(done.status, QueryStatus::Completed);

        let records = store.fetch_agent_records(query.id).await.unwrap();
        for (agent, _) in AGENT_ROSTER {
            let latest = latest_for(&records, agent);
            assert_eq!(latest.status, AgentStatus::Completed);
            assert_eq!(latest.progress, 100);
        }

        let result = store.fetch_result(query.id).await.unwrap();
        assert!(result.summary.contains("Renewable energy trends"));
    }

    #[tokio::test]
    async fn roster_is_seeded_before_any_stage_runs() {
        let store = Arc::new(MemoryStore::new());
        let query = seeded(&store).await;
        let executor = ScriptedExecutor::new().with_failure(Stage::Browser, "no network");
        let pipeline = ResearchPipeline::new(Arc::clone(&store), executor);

        let _ = pipeline.execute(query.id).await;

        let records = store.fetch_agent_records(query.id).await.unwrap();
        // Even with the first stage dead, every later agent is visible
        // as waiting with its initial message
        let synthesis = latest_for(&records, "Synthesis Agent");
        assert_eq!(synthesis.status, AgentStatus::Waiting);
        assert_eq!(
            synthesis.current_task.as_deref(),
            Some("Waiting to compile final report")
        );
    }

    #[tokio::test]
    async fn stage_failure_records_error_and_resets_query() {
        let store = Arc::new(MemoryStore::new());
        let query = seeded(&store).await;
        let executor =
            ScriptedExecutor::new().with_failure(Stage::Researcher, "search quota exhausted");
        let pipeline = ResearchPipeline::new(Arc::clone(&store), executor);

        let err = pipeline.execute(query.id).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::StageFailed {
                stage: Stage::Researcher,
                ..
            }
        ));

        // Query reset for retry
        let reset = store.fetch_query(query.id).await.unwrap();
        assert_eq!(reset.status, QueryStatus::Waiting);

        // Failing agent carries the error, earlier agents keep their
        // completions, later agents never started
        let records = store.fetch_agent_records(query.id).await.unwrap();
        let failed = latest_for(&records, "Academic Research Agent");
        assert_eq!(failed.status, AgentStatus::Error);
        assert_eq!(failed.current_task.as_deref(), Some("Research failed"));
        assert_eq!(
            latest_for(&records, "Editor Agent").status,
            AgentStatus::Completed
        );
        assert_eq!(
            latest_for(&records, "Fact Checker Agent").status,
            AgentStatus::Waiting
        );

        // No result was published
        assert!(matches!(
            store.fetch_result(query.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn status_advances_with_the_stages() {
        let store = Arc::new(MemoryStore::new());
        let query = seeded(&store).await;
        let executor = ScriptedExecutor::new().with_failure(Stage::Reviewer, "flagged claims");
        let pipeline = ResearchPipeline::new(Arc::clone(&store), executor);

        let _ = pipeline.execute(query.id).await;

        // The reviewer stage was entered, so the query reached
        // fact_checking before the failure reset it
        let records = store.fetch_agent_records(query.id).await.unwrap();
        assert_eq!(
            latest_for(&records, "Fact Checker Agent").status,
            AgentStatus::Error
        );
        let reset = store.fetch_query(query.id).await.unwrap();
        assert_eq!(reset.status, QueryStatus::Waiting);
    }

    #[tokio::test]
    async fn missing_query_aborts_before_any_write() {
        let mut store = MockProgressStore::new();
        let query_id = QueryId::new();
        store
            .expect_fetch_query()
            .times(1)
            .returning(move |id| Err(StoreError::NotFound(id)));

        let pipeline = ResearchPipeline::new(Arc::new(store), ScriptedExecutor::new());
        let err = pipeline.execute(query_id).await.unwrap_err();
        assert!(matches!(err, PipelineError::Store(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn store_outage_during_seeding_resets_query() {
        let mut store = MockProgressStore::new();
        let query_id = QueryId::new();
        let query = ResearchQuery::from_draft(QueryDraft::new("topic").unwrap());
        let fetched = query.clone();
        store
            .expect_fetch_query()
            .times(1)
            .returning(move |_| Ok(fetched.clone()));
        store
            .expect_record_progress()
            .times(1)
            .returning(|_| Err(StoreError::Unavailable("connection reset".into())));
        store
            .expect_update_query_status()
            .withf(|_, status| *status == QueryStatus::Waiting)
            .times(1)
            .returning(|_, _| Ok(()));

        let pipeline = ResearchPipeline::new(Arc::new(store), ScriptedExecutor::new());
        let err = pipeline.execute(query_id).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Store(StoreError::Unavailable(_))
        ));
    }
}
