//! The fixed stage sequence and its reporting choreography

use relay_model::QueryStatus;

/// One stage of the research workflow, in execution order
///
/// Each stage reports under a fixed display agent name and a fixed
/// "active" percentage; completion is always reported at 100. The
/// percentages are display waypoints, not measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Initial web searching
    Browser,
    /// Outline creation
    Editor,
    /// In-depth section research
    Researcher,
    /// Review and fact-checking
    Reviewer,
    /// Final report synthesis
    Writer,
}

impl Stage {
    /// All stages, in execution order
    pub const ALL: [Stage; 5] = [
        Stage::Browser,
        Stage::Editor,
        Stage::Researcher,
        Stage::Reviewer,
        Stage::Writer,
    ];

    /// Display name the stage reports progress under
    #[must_use]
    pub fn agent_name(self) -> &'static str {
        match self {
            Stage::Browser => "Web Research Agent",
            Stage::Editor => "Editor Agent",
            Stage::Researcher => "Academic Research Agent",
            Stage::Reviewer => "Fact Checker Agent",
            Stage::Writer => "Synthesis Agent",
        }
    }

    /// Percentage reported when the stage becomes active
    #[must_use]
    pub fn active_progress(self) -> u8 {
        match self {
            Stage::Browser => 25,
            Stage::Editor => 50,
            Stage::Researcher => 60,
            Stage::Reviewer => 75,
            Stage::Writer => 90,
        }
    }

    /// Task line shown while the stage runs
    #[must_use]
    pub fn active_task(self) -> &'static str {
        match self {
            Stage::Browser => "Searching web sources...",
            Stage::Editor => "Creating research outline...",
            Stage::Researcher => "Researching sections in parallel...",
            Stage::Reviewer => "Fact-checking and reviewing content...",
            Stage::Writer => "Compiling final report...",
        }
    }

    /// Task line shown once the stage completes
    #[must_use]
    pub fn completed_task(self) -> &'static str {
        match self {
            Stage::Browser => "Web research completed",
            Stage::Editor => "Outline created",
            Stage::Researcher => "In-depth research completed",
            Stage::Reviewer => "Review and fact-checking completed",
            Stage::Writer => "Report compilation completed",
        }
    }

    /// Task line shown when the stage fails
    #[must_use]
    pub fn failed_task(self) -> &'static str {
        match self {
            Stage::Browser => "Web research failed",
            Stage::Editor => "Outline creation failed",
            Stage::Researcher => "Research failed",
            Stage::Reviewer => "Review failed",
            Stage::Writer => "Report compilation failed",
        }
    }

    /// Query status the stage advances the query to on entry, if any
    #[must_use]
    pub fn query_status(self) -> Option<QueryStatus> {
        match self {
            Stage::Browser => Some(QueryStatus::Researching),
            Stage::Researcher => Some(QueryStatus::Analyzing),
            Stage::Reviewer => Some(QueryStatus::FactChecking),
            Stage::Editor | Stage::Writer => None,
        }
    }
}
