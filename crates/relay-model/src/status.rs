//! Status enums and their plain-string wire forms
//!
//! Statuses travel as plain strings. The query status set is closed (an
//! error condition is signaled through agent records, never as a query
//! status); the agent status set is open so records written by a newer
//! backend pass through aggregation unfiltered.

use serde::{Deserialize, Serialize};

/// Overall state of a research query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    /// Submitted but not yet picked up by the pipeline
    Waiting,
    /// Pipeline accepted the query and is seeding agent records
    Initializing,
    /// Web research and outline stages
    Researching,
    /// In-depth section research
    Analyzing,
    /// Review and fact-checking
    FactChecking,
    /// Final report persisted; query is immutable except for deletion
    Completed,
}

impl QueryStatus {
    /// Wire string for this status
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Initializing => "initializing",
            Self::Researching => "researching",
            Self::Analyzing => "analyzing",
            Self::FactChecking => "fact_checking",
            Self::Completed => "completed",
        }
    }

    /// Whether the query has reached its terminal state
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a single pipeline agent
///
/// Open enum: statuses this crate does not know about are carried in
/// `Other` and survive serialization untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgentStatus {
    /// Not yet started
    Waiting,
    /// Currently working
    Active,
    /// Finished its stage
    Completed,
    /// Failed; terminal for progress display, not for polling
    Error,
    /// Unrecognized status, preserved verbatim
    Other(String),
}

impl AgentStatus {
    /// Wire string for this status
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Other(s) => s,
        }
    }

    /// Whether this status flags a pipeline-reported failure
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl From<String> for AgentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "waiting" => Self::Waiting,
            "active" => Self::Active,
            "completed" => Self::Completed,
            "error" => Self::Error,
            _ => Self::Other(s),
        }
    }
}

impl From<AgentStatus> for String {
    fn from(status: AgentStatus) -> Self {
        status.as_str().to_owned()
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
