//! Query drafts - validated creation input
//!
//! A draft captures everything the submitter specifies to guide the
//! research. Validation happens at construction; a draft that exists is
//! well-formed.

use serde::{Deserialize, Serialize};

/// Desired level of detail for the research
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResearchDepth {
    /// High-level overview
    #[serde(rename = "Basic Overview")]
    BasicOverview,
    /// Full analysis across perspectives
    #[serde(rename = "Comprehensive Analysis")]
    ComprehensiveAnalysis,
    /// Deep dive with expert-level sourcing
    #[serde(rename = "Expert-Level Deep Dive")]
    ExpertDeepDive,
}

impl Default for ResearchDepth {
    fn default() -> Self {
        Self::ComprehensiveAnalysis
    }
}

/// Output format for the final report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Markdown document (the only format currently produced)
    Markdown,
}

impl Default for ReportFormat {
    fn default() -> Self {
        Self::Markdown
    }
}

/// Draft validation errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DraftError {
    /// Topic missing or whitespace-only
    #[error("topic must be non-empty")]
    EmptyTopic,
}

/// Validated input for creating a research query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDraft {
    /// Main topic or question (non-empty)
    pub topic: String,
    /// Desired depth
    pub depth: ResearchDepth,
    /// Viewpoints to consider, free-form tags
    pub perspectives: Vec<String>,
    /// Report output format
    pub format: ReportFormat,
    /// Preferred source types, free-form tags
    pub sources: Vec<String>,
    /// Historical time frame (e.g. "Last 5 years")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
}

impl QueryDraft {
    /// Create a draft with defaults for everything but the topic
    ///
    /// # Errors
    /// - `DraftError::EmptyTopic` if the topic is empty or whitespace-only
    pub fn new(topic: impl Into<String>) -> Result<Self, DraftError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(DraftError::EmptyTopic);
        }
        Ok(Self {
            topic,
            depth: ResearchDepth::default(),
            perspectives: Vec::new(),
            format: ReportFormat::default(),
            sources: Vec::new(),
            timeframe: None,
        })
    }

    /// With research depth
    #[inline]
    #[must_use]
    pub fn with_depth(mut self, depth: ResearchDepth) -> Self {
        self.depth = depth;
        self
    }

    /// With perspectives
    #[inline]
    #[must_use]
    pub fn with_perspectives(mut self, perspectives: Vec<String>) -> Self {
        self.perspectives = perspectives;
        self
    }

    /// With source tags
    #[inline]
    #[must_use]
    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    /// With time frame
    #[inline]
    #[must_use]
    pub fn with_timeframe(mut self, timeframe: impl Into<String>) -> Self {
        self.timeframe = Some(timeframe.into());
        self
    }
}
