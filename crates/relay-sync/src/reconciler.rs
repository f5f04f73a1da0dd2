//! The reconciliation loop
//!
//! One `Reconciler` per logical subscriber. It owns the subscription
//! lifecycle explicitly: `Idle` with no query, `Subscribed` with the
//! push channel open and polling active, `Closing` while teardown
//! drains. Changing the query always tears the previous channel down
//! before opening the next one, so no two channels are ever live for the
//! same subscriber.
//!
//! Freshness comes from two independent signals. Push notices carry no
//! payload and may be dropped, duplicated, or reordered; each one only
//! schedules a debounced re-fetch. The fixed-interval poll fires fetch
//! attempts regardless, so a lost notice costs bounded delay, never
//! permanent staleness. Every fetch re-reads the full record set and
//! recomputes through the pure aggregator; results carry a sequence
//! number and a result older than the newest applied one is discarded,
//! which also makes teardown effective against in-flight requests.

use crate::aggregate::AggregatedProgress;
use crate::config::SyncConfig;
use crate::snapshot::{SyncEvent, SyncPhase, SyncSnapshot};
use relay_model::{ProgressRecord, QueryId, ResearchQuery};
use relay_store::{ChangeFeed, ProgressStore, StoreError};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};

/// Lifecycle state of a reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// No active query
    Idle,
    /// Channel open, polling active
    Subscribed(QueryId),
    /// Teardown in progress
    Closing,
}

/// Read side handed to the presentation layer
#[derive(Debug)]
pub struct SyncObserver {
    /// Latest snapshot; replaced wholesale on every applied fetch
    pub snapshot: watch::Receiver<SyncSnapshot>,
    /// One-shot transition notifications (toasts)
    pub events: mpsc::Receiver<SyncEvent>,
}

struct Active {
    query_id: QueryId,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Owned subscription merging push notices with a polling fallback
pub struct Reconciler<S> {
    store: Arc<S>,
    config: SyncConfig,
    snapshot_tx: Arc<watch::Sender<SyncSnapshot>>,
    events_tx: mpsc::Sender<SyncEvent>,
    state: SubscriptionState,
    active: Option<Active>,
}

impl<S> Reconciler<S>
where
    S: ProgressStore + ChangeFeed + 'static,
{
    /// Create an idle reconciler and its observer handle
    #[must_use]
    pub fn new(store: Arc<S>, config: SyncConfig) -> (Self, SyncObserver) {
        let (snapshot_tx, snapshot_rx) = watch::channel(SyncSnapshot::default());
        let (events_tx, events_rx) = mpsc::channel(config.event_buffer);
        let reconciler = Self {
            store,
            config,
            snapshot_tx: Arc::new(snapshot_tx),
            events_tx,
            state: SubscriptionState::Idle,
            active: None,
        };
        let observer = SyncObserver {
            snapshot: snapshot_rx,
            events: events_rx,
        };
        (reconciler, observer)
    }

    /// Current lifecycle state
    #[inline]
    #[must_use]
    pub fn state(&self) -> SubscriptionState {
        self.state
    }

    /// Switch the active query
    ///
    /// `None` tears the subscription down. A different id tears the
    /// previous channel down first, then opens the new one. The same id
    /// is a no-op, keeping the existing channel.
    pub async fn set_query(&mut self, query_id: Option<QueryId>) {
        if let Some(active) = &self.active {
            if query_id == Some(active.query_id) {
                return;
            }
        }
        self.teardown().await;
        if let Some(query_id) = query_id {
            self.open(query_id);
        }
    }

    /// Tear the subscription down; safe to call when already idle
    pub async fn close(&mut self) {
        self.teardown().await;
    }

    async fn teardown(&mut self) {
        if let Some(active) = self.active.take() {
            self.state = SubscriptionState::Closing;
            let _ = active.shutdown_tx.send(true);
            // After this join, no scheduled callback can touch the
            // snapshot: only the loop task writes it.
            let _ = active.task.await;
            tracing::debug!(query_id = %active.query_id, "subscription closed");
        }
        self.state = SubscriptionState::Idle;
    }

    fn open(&mut self, query_id: QueryId) {
        self.snapshot_tx.send_replace(SyncSnapshot::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_subscription(
            Arc::clone(&self.store),
            query_id,
            self.config,
            Arc::clone(&self.snapshot_tx),
            self.events_tx.clone(),
            shutdown_rx,
        ));
        self.active = Some(Active {
            query_id,
            shutdown_tx,
            task,
        });
        self.state = SubscriptionState::Subscribed(query_id);
        tracing::debug!(%query_id, "subscription opened");
    }
}

type FetchOutcome = Result<(ResearchQuery, Vec<ProgressRecord>), StoreError>;

/// Per-subscription event loop
///
/// Single logical thread: timer ticks, feed notices, and fetch results
/// interleave through one `select!`. Fetches run as spawned tasks and
/// report back tagged with a sequence number.
async fn run_subscription<S>(
    store: Arc<S>,
    query_id: QueryId,
    config: SyncConfig,
    snapshot_tx: Arc<watch::Sender<SyncSnapshot>>,
    events_tx: mpsc::Sender<SyncEvent>,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    S: ProgressStore + ChangeFeed + 'static,
{
    let (results_tx, mut results_rx) = mpsc::unbounded_channel::<(u64, FetchOutcome)>();
    let mut issued: u64 = 0;
    let mut applied: u64 = 0;
    let mut last_completed: Option<Instant> = None;
    let mut debounce_deadline: Option<Instant> = None;

    // Entry order: seed fetch, then push channel, then poll timer. The
    // gap between seed and subscribe is healed by the first poll tick.
    spawn_fetch(&store, query_id, &mut issued, &results_tx);
    let mut feed = store.subscribe(query_id);
    let mut feed_open = true;
    let mut poll = interval_at(Instant::now() + config.poll_interval, config.poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let debounce_at = debounce_deadline.unwrap_or_else(Instant::now);
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            notice = feed.changed(), if feed_open => match notice {
                Some(_) => {
                    // Payload-free invalidate; bursts coalesce onto the
                    // deadline set by the first notice
                    if debounce_deadline.is_none() {
                        debounce_deadline = Some(Instant::now() + config.debounce);
                    }
                }
                None => {
                    tracing::warn!(%query_id, "change feed closed; polling continues");
                    feed_open = false;
                }
            },
            () = sleep_until(debounce_at), if debounce_deadline.is_some() => {
                debounce_deadline = None;
                request_fetch(&store, query_id, &config, last_completed, &mut issued, &results_tx);
            }
            _ = poll.tick() => {
                request_fetch(&store, query_id, &config, last_completed, &mut issued, &results_tx);
            }
            Some((seq, outcome)) = results_rx.recv() => {
                last_completed = Some(Instant::now());
                if seq <= applied {
                    tracing::trace!(%query_id, seq, applied, "discarding superseded fetch result");
                } else {
                    applied = seq;
                    apply_outcome(query_id, outcome, &snapshot_tx, &events_tx);
                }
            }
        }
    }
    feed.close();
}

/// Fetch attempt subject to the minimum inter-fetch interval
///
/// A request landing inside the gap is dropped, not queued: the store is
/// the source of truth, so the next poll tick picks the change up anyway.
fn request_fetch<S>(
    store: &Arc<S>,
    query_id: QueryId,
    config: &SyncConfig,
    last_completed: Option<Instant>,
    issued: &mut u64,
    results_tx: &mpsc::UnboundedSender<(u64, FetchOutcome)>,
) where
    S: ProgressStore + 'static,
{
    if let Some(done) = last_completed {
        if done.elapsed() < config.min_fetch_interval {
            tracing::trace!(%query_id, "fetch dropped by min-interval guard");
            return;
        }
    }
    spawn_fetch(store, query_id, issued, results_tx);
}

fn spawn_fetch<S>(
    store: &Arc<S>,
    query_id: QueryId,
    issued: &mut u64,
    results_tx: &mpsc::UnboundedSender<(u64, FetchOutcome)>,
) where
    S: ProgressStore + 'static,
{
    *issued += 1;
    let seq = *issued;
    let store = Arc::clone(store);
    let results_tx = results_tx.clone();
    tokio::spawn(async move {
        let outcome = fetch_state(&*store, query_id).await;
        // Send fails only after teardown; the result is then irrelevant
        let _ = results_tx.send((seq, outcome));
    });
}

async fn fetch_state<S>(store: &S, query_id: QueryId) -> FetchOutcome
where
    S: ProgressStore + ?Sized,
{
    let query = store.fetch_query(query_id).await?;
    let records = store.fetch_agent_records(query_id).await?;
    Ok((query, records))
}

/// Fold a fetch outcome into the published snapshot
///
/// Transient errors keep the last known state; stale-but-known beats
/// empty. Events fire at most once per actual transition because the
/// snapshot is only replaced when it differs from the previous one.
fn apply_outcome(
    query_id: QueryId,
    outcome: FetchOutcome,
    snapshot_tx: &watch::Sender<SyncSnapshot>,
    events_tx: &mpsc::Sender<SyncEvent>,
) {
    match outcome {
        Ok((query, records)) => {
            let next = SyncSnapshot {
                phase: SyncPhase::Live,
                query: Some(query),
                agents: AggregatedProgress::aggregate(&records),
            };
            let prev = snapshot_tx.borrow().clone();
            if next == prev {
                return;
            }

            let mut events = Vec::new();
            if next.agents != prev.agents {
                events.push(SyncEvent::ProgressChanged);
            }
            for record in next.agents.entries().iter().filter(|r| r.status.is_error()) {
                let was_error = prev
                    .agents
                    .get(&record.agent_name)
                    .is_some_and(|p| p.status.is_error());
                if !was_error {
                    events.push(SyncEvent::PipelineError {
                        agent_name: record.agent_name.clone(),
                    });
                }
            }
            if next.is_completed() && !prev.is_completed() {
                events.push(SyncEvent::QueryCompleted);
            }

            snapshot_tx.send_replace(next);
            emit(events_tx, events);
        }
        Err(StoreError::NotFound(_)) => {
            if snapshot_tx.borrow().phase == SyncPhase::NotFound {
                return;
            }
            snapshot_tx.send_replace(SyncSnapshot {
                phase: SyncPhase::NotFound,
                query: None,
                agents: AggregatedProgress::default(),
            });
            emit(events_tx, vec![SyncEvent::QueryNotFound]);
        }
        Err(err) => {
            tracing::warn!(%query_id, error = %err, "fetch failed; keeping last known state");
        }
    }
}

fn emit(events_tx: &mpsc::Sender<SyncEvent>, events: Vec<SyncEvent>) {
    for event in events {
        if events_tx.try_send(event).is_err() {
            tracing::debug!("notification dropped: observer not keeping up");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_model::QueryDraft;
    use relay_store::MemoryStore;

    #[tokio::test]
    async fn starts_idle() {
        let store = Arc::new(MemoryStore::new());
        let (reconciler, _observer) = Reconciler::new(store, SyncConfig::default());
        assert_eq!(reconciler.state(), SubscriptionState::Idle);
    }

    #[tokio::test]
    async fn set_query_transitions() {
        let store = Arc::new(MemoryStore::new());
        let first = store
            .create_query(QueryDraft::new("topic one").unwrap())
            .await
            .unwrap();
        let second = store
            .create_query(QueryDraft::new("topic two").unwrap())
            .await
            .unwrap();

        let (mut reconciler, _observer) = Reconciler::new(store, SyncConfig::default());

        reconciler.set_query(Some(first.id)).await;
        assert_eq!(reconciler.state(), SubscriptionState::Subscribed(first.id));

        // Same id keeps the existing channel
        reconciler.set_query(Some(first.id)).await;
        assert_eq!(reconciler.state(), SubscriptionState::Subscribed(first.id));

        // Different id re-subscribes
        reconciler.set_query(Some(second.id)).await;
        assert_eq!(reconciler.state(), SubscriptionState::Subscribed(second.id));

        reconciler.set_query(None).await;
        assert_eq!(reconciler.state(), SubscriptionState::Idle);
    }

    #[tokio::test]
    async fn close_is_safe_when_idle() {
        let store = Arc::new(MemoryStore::new());
        let (mut reconciler, _observer) = Reconciler::new(store, SyncConfig::default());
        reconciler.close().await;
        reconciler.close().await;
        assert_eq!(reconciler.state(), SubscriptionState::Idle);
    }
}
