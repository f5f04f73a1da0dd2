//! Latest-wins aggregation of the progress log
//!
//! The store keeps every progress update; this module folds that history
//! into one entry per agent. The fold is a pure function of the record
//! *set*: input arrival order never affects the output.
//!
//! Winner per agent: greatest (updated_at, progress, record id), with a
//! missing timestamp ranked at epoch so any timestamped record
//! supersedes one without. Display order: each agent's first appearance
//! when the set is scanned oldest-first (timestamp, then record id).

use indexmap::IndexMap;
use relay_model::ProgressRecord;

/// One display entry per agent, projected from the progress log
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AggregatedProgress {
    entries: Vec<ProgressRecord>,
}

impl AggregatedProgress {
    /// Fold an unordered batch of records into per-agent latest state
    #[must_use]
    pub fn aggregate(records: &[ProgressRecord]) -> Self {
        // Canonical scan order makes both the winners and the display
        // order independent of arrival order.
        let mut canonical: Vec<&ProgressRecord> = records.iter().collect();
        canonical.sort_by_key(|r| (r.effective_timestamp(), r.id));

        let mut latest: IndexMap<&str, &ProgressRecord> = IndexMap::new();
        for record in canonical {
            match latest.entry(record.agent_name.as_str()) {
                indexmap::map::Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                indexmap::map::Entry::Occupied(mut slot) => {
                    let incumbent = *slot.get();
                    let candidate_key =
                        (record.effective_timestamp(), record.progress, record.id);
                    let incumbent_key = (
                        incumbent.effective_timestamp(),
                        incumbent.progress,
                        incumbent.id,
                    );
                    if candidate_key > incumbent_key {
                        slot.insert(record);
                    }
                }
            }
        }

        Self {
            entries: latest.into_values().cloned().collect(),
        }
    }

    /// Entries in stable display order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[ProgressRecord] {
        &self.entries
    }

    /// Latest record for one agent
    #[must_use]
    pub fn get(&self, agent_name: &str) -> Option<&ProgressRecord> {
        self.entries.iter().find(|r| r.agent_name == agent_name)
    }

    /// First agent currently flagged as errored, if any
    #[must_use]
    pub fn first_error(&self) -> Option<&ProgressRecord> {
        self.entries.iter().find(|r| r.status.is_error())
    }

    /// Number of distinct agents seen
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no agent has reported yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
