//! Producer/observer round trips: the pipeline writes, a reconciler
//! subscription watches the same store converge.

use relay_model::{AgentStatus, QueryStatus};
use relay_pipeline::{ResearchPipeline, ScriptedExecutor, Stage};
use relay_store::{MemoryStore, ProgressStore};
use relay_sync::{Reconciler, SyncConfig, SyncEvent, SyncObserver, SyncPhase, SyncSnapshot};
use relay_test_utils::create_seeded_query;
use std::sync::Arc;
use std::time::Duration;

async fn wait_for(
    observer: &mut SyncObserver,
    pred: impl Fn(&SyncSnapshot) -> bool,
) -> SyncSnapshot {
    tokio::time::timeout(Duration::from_secs(120), async {
        loop {
            {
                let current = observer.snapshot.borrow();
                if pred(&current) {
                    return current.clone();
                }
            }
            observer.snapshot.changed().await.expect("publisher gone");
        }
    })
    .await
    .expect("snapshot never satisfied predicate")
}

#[tokio::test(start_paused = true)]
async fn observer_follows_a_full_workflow_run() {
    let store = Arc::new(MemoryStore::new());
    let query = create_seeded_query(&*store).await;

    let (mut reconciler, mut observer) = Reconciler::new(Arc::clone(&store), SyncConfig::default());
    reconciler.set_query(Some(query.id)).await;
    wait_for(&mut observer, |s| s.phase == SyncPhase::Live).await;

    let pipeline = ResearchPipeline::new(Arc::clone(&store), ScriptedExecutor::new());
    pipeline.execute(query.id).await.unwrap();

    let snapshot = wait_for(&mut observer, SyncSnapshot::is_completed).await;
    assert_eq!(snapshot.agents.len(), 5);
    assert!(snapshot
        .agents
        .entries()
        .iter()
        .all(|a| a.status == AgentStatus::Completed && a.progress == 100));

    let mut saw_completion = false;
    while let Ok(event) = observer.events.try_recv() {
        saw_completion |= event == SyncEvent::QueryCompleted;
    }
    assert!(saw_completion);

    let result = store.fetch_result(query.id).await.unwrap();
    assert_eq!(result.query_id, query.id);

    reconciler.close().await;
}

#[tokio::test(start_paused = true)]
async fn observer_surfaces_a_stage_failure() {
    let store = Arc::new(MemoryStore::new());
    let query = create_seeded_query(&*store).await;

    let (mut reconciler, mut observer) = Reconciler::new(Arc::clone(&store), SyncConfig::default());
    reconciler.set_query(Some(query.id)).await;
    wait_for(&mut observer, |s| s.phase == SyncPhase::Live).await;

    let executor = ScriptedExecutor::new().with_failure(Stage::Researcher, "search quota exhausted");
    let pipeline = ResearchPipeline::new(Arc::clone(&store), executor);
    pipeline.execute(query.id).await.unwrap_err();

    let snapshot = wait_for(&mut observer, |s| {
        s.pipeline_error().is_some() && s.query.as_ref().is_some_and(|q| q.status == QueryStatus::Waiting)
    })
    .await;
    assert_eq!(
        snapshot.pipeline_error().unwrap().agent_name,
        "Academic Research Agent"
    );

    let mut error_agents = Vec::new();
    while let Ok(event) = observer.events.try_recv() {
        if let SyncEvent::PipelineError { agent_name } = event {
            error_agents.push(agent_name);
        }
    }
    assert_eq!(error_agents, vec!["Academic Research Agent".to_string()]);

    reconciler.close().await;
}
