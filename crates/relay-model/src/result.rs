//! Final research results
//!
//! The result is an opaque artifact as far as the sync core is
//! concerned; it is fetched once after the parent query completes.
//! Structural cleanup here mirrors what the backend does before
//! persisting: derive a bounded title and drop malformed source and
//! perspective entries.

use crate::ids::QueryId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const MAX_TITLE_LEN: usize = 100;

/// Compiled final report for one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchResult {
    /// Query this result belongs to
    pub query_id: QueryId,
    /// Report title, at most 100 characters
    pub title: String,
    /// Executive summary
    pub summary: String,
    /// Report body: `{ "sections": [...] }`
    pub content: Value,
    /// Cited sources: `{ "sources": [...] }`
    pub sources: Value,
    /// Covered perspectives: `{ "perspectives": [...] }`
    pub perspectives: Value,
}

impl ResearchResult {
    /// Build a result, deriving the title and pruning malformed entries
    #[must_use]
    pub fn compile(
        query_id: QueryId,
        title: Option<String>,
        summary: String,
        sections: Vec<Value>,
        sources: Value,
        perspectives: Value,
    ) -> Self {
        let title = clamp_title(title.unwrap_or_else(|| first_sentence(&summary)));
        Self {
            query_id,
            title,
            summary,
            content: serde_json::json!({ "sections": sections }),
            sources: prune_entries(sources, "sources", |s| {
                non_blank(s, "title") && s.get("title").and_then(Value::as_str) != Some("source")
            }),
            perspectives: prune_entries(perspectives, "perspectives", |p| {
                non_blank(p, "title") && non_blank(p, "viewpoint")
            }),
        }
    }
}

fn first_sentence(summary: &str) -> String {
    summary
        .split('.')
        .next()
        .unwrap_or("Research Results")
        .to_owned()
}

fn clamp_title(title: String) -> String {
    if title.chars().count() > MAX_TITLE_LEN {
        let cut: String = title.chars().take(MAX_TITLE_LEN - 3).collect();
        format!("{cut}...")
    } else {
        title
    }
}

fn non_blank(entry: &Value, key: &str) -> bool {
    entry
        .get(key)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

/// Keep only entries under `key` that pass `keep`; non-object inputs are
/// normalized to an empty list.
fn prune_entries(value: Value, key: &str, keep: impl Fn(&Value) -> bool) -> Value {
    let entries = value
        .get(key)
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter(|e| e.is_object() && keep(e))
                .cloned()
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    serde_json::json!({ key: entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn title_falls_back_to_first_sentence() {
        let result = ResearchResult::compile(
            QueryId::new(),
            None,
            "Solar adoption is accelerating. Storage lags behind.".to_string(),
            vec![],
            json!({"sources": []}),
            json!({"perspectives": []}),
        );
        assert_eq!(result.title, "Solar adoption is accelerating");
    }

    #[test]
    fn long_title_is_clamped() {
        let long = "x".repeat(150);
        let result = ResearchResult::compile(
            QueryId::new(),
            Some(long),
            "summary".to_string(),
            vec![],
            json!({"sources": []}),
            json!({"perspectives": []}),
        );
        assert_eq!(result.title.chars().count(), MAX_TITLE_LEN);
        assert!(result.title.ends_with("..."));
    }

    #[test]
    fn malformed_sources_are_dropped() {
        let result = ResearchResult::compile(
            QueryId::new(),
            Some("t".to_string()),
            "s".to_string(),
            vec![],
            json!({"sources": [
                {"title": "Solar report", "url": "https://example.com"},
                {"title": "source"},
                {"title": "  "},
                {"url": "no title"},
            ]}),
            json!({"perspectives": [
                {"title": "Economic", "viewpoint": "Costs are falling"},
                {"title": "Missing viewpoint"},
            ]}),
        );
        assert_eq!(result.sources["sources"].as_array().unwrap().len(), 1);
        assert_eq!(
            result.perspectives["perspectives"].as_array().unwrap().len(),
            1
        );
    }
}
