//! The `ChangeFeed` contract
//!
//! A change notice is a pure invalidate signal: it says *that* a row
//! changed, never *what* changed. The transport may duplicate, reorder,
//! or silently drop notices; polling in the sync core guarantees forward
//! progress regardless.

use relay_model::QueryId;
use tokio::sync::mpsc;

/// Which table a change notice refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangedTable {
    /// The progress record log
    AgentProgress,
    /// The parent query rows
    ResearchQueries,
}

/// A payload-free row-change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeNotice {
    /// Query the change belongs to
    pub query_id: QueryId,
    /// Table that changed
    pub table: ChangedTable,
}

/// Push-channel source of change notices
pub trait ChangeFeed: Send + Sync {
    /// Open a subscription scoped to one query
    fn subscribe(&self, query_id: QueryId) -> ChangeSubscription;
}

/// An open change-feed subscription
///
/// Dropping the subscription closes it; `close` is idempotent and may be
/// called any number of times.
#[derive(Debug)]
pub struct ChangeSubscription {
    rx: Option<mpsc::UnboundedReceiver<ChangeNotice>>,
}

impl ChangeSubscription {
    /// Wrap a transport receiver
    #[inline]
    #[must_use]
    pub fn new(rx: mpsc::UnboundedReceiver<ChangeNotice>) -> Self {
        Self { rx: Some(rx) }
    }

    /// A subscription that never delivers anything
    ///
    /// Stands in for a transport that failed to connect; the sync core
    /// falls back to polling alone.
    #[inline]
    #[must_use]
    pub fn disconnected() -> Self {
        Self { rx: None }
    }

    /// Wait for the next notice
    ///
    /// Returns `None` once the subscription is closed or the transport
    /// has gone away.
    pub async fn changed(&mut self) -> Option<ChangeNotice> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    /// Close the subscription; idempotent
    pub fn close(&mut self) {
        if let Some(rx) = self.rx.as_mut() {
            rx.close();
        }
        self.rx = None;
    }

    /// Whether the subscription is still open
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.rx.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscription_delivers_notices() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut sub = ChangeSubscription::new(rx);

        let notice = ChangeNotice {
            query_id: QueryId::new(),
            table: ChangedTable::AgentProgress,
        };
        tx.send(notice).unwrap();

        assert_eq!(sub.changed().await, Some(notice));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut sub = ChangeSubscription::new(rx);

        sub.close();
        sub.close();
        assert!(!sub.is_open());
        assert!(sub.changed().await.is_none());

        // Sender observes the closed channel
        let notice = ChangeNotice {
            query_id: QueryId::new(),
            table: ChangedTable::ResearchQueries,
        };
        assert!(tx.send(notice).is_err());
    }

    #[tokio::test]
    async fn disconnected_subscription_yields_nothing() {
        let mut sub = ChangeSubscription::disconnected();
        assert!(!sub.is_open());
        assert!(sub.changed().await.is_none());
    }
}
