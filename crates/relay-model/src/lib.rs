//! Relay Model - data model for the research progress tracker
//!
//! Defines the shared vocabulary of the workspace:
//! - Id newtypes for queries and progress records
//! - Status enums with their plain-string wire forms
//! - Progress records (the append/update log the store keeps)
//! - Query drafts (validated creation input)
//! - The opaque final result blob

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod draft;
pub mod ids;
pub mod query;
pub mod record;
pub mod result;
pub mod status;

pub use draft::{DraftError, QueryDraft, ReportFormat, ResearchDepth};
pub use ids::{QueryId, RecordId};
pub use query::ResearchQuery;
pub use record::ProgressRecord;
pub use result::ResearchResult;
pub use status::{AgentStatus, QueryStatus};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the relay data model
    pub use crate::{
        AgentStatus, ProgressRecord, QueryDraft, QueryId, QueryStatus, RecordId, ResearchQuery,
        ResearchResult,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
