//! Pipeline errors

use crate::stage::Stage;
use relay_store::StoreError;
use thiserror::Error;

/// Failure of a workflow run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A store operation failed and the run cannot continue
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    /// A stage's work failed; the agent error record was written and
    /// the query was reset for retry
    #[error("{} failed: {message}", stage.agent_name())]
    StageFailed {
        /// Stage that failed
        stage: Stage,
        /// Failure description from the executor
        message: String,
    },

    /// The final report could not be produced or persisted
    #[error("publication failed: {0}")]
    PublicationFailed(String),
}
