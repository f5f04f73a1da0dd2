//! Relay Pipeline - the producing side of the progress protocol
//!
//! Drives a research query through its fixed sequence of stages,
//! writing the progress records and status transitions that the sync
//! core observes. The actual research work stays opaque behind the
//! [`StageExecutor`] seam; this crate only knows the choreography:
//! which agent reports when, at what percentage, and what happens to
//! the query when a stage fails.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod executor;
pub mod pipeline;
pub mod stage;

pub use error::PipelineError;
pub use executor::{ReportDraft, ScriptedExecutor, StageError, StageExecutor};
pub use pipeline::ResearchPipeline;
pub use stage::Stage;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
