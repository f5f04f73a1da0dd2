//! Store error taxonomy
//!
//! Two failure classes cross the store boundary:
//! - `Unavailable`: transient; the next poll or debounce cycle retries
//!   implicitly and the caller keeps its last known state
//! - `NotFound`: a definite answer, surfaced to the presentation layer
//!   as distinct from "still loading"

use relay_model::QueryId;

/// Errors returned by store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Network or backend failure; retry on the next cycle
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// No record matches the given query id
    #[error("query not found: {0}")]
    NotFound(QueryId),

    /// Write rejected (e.g. mutating a completed query)
    #[error("write rejected: {0}")]
    WriteRejected(String),
}

impl StoreError {
    /// Whether the next fetch cycle may succeed without intervention
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(StoreError::Unavailable("timeout".to_string()).is_transient());
        assert!(!StoreError::NotFound(QueryId::new()).is_transient());
        assert!(!StoreError::WriteRejected("completed".to_string()).is_transient());
    }

    #[test]
    fn display_includes_query_id() {
        let id = QueryId::new();
        let msg = StoreError::NotFound(id).to_string();
        assert!(msg.contains(&id.to_string()));
    }
}
