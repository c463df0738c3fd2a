use serde::Serialize;

use crate::models::{CriteriaSet, Record, ThreadId};
use crate::services::slots::{ExtractedValues, Slot, SlotId};

/// Counts from loading one listing set into the store and the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub stored: usize,
    /// Listings without identifier or description are stored but not indexed
    pub indexed: usize,
}

/// Result of one user turn, handed to the reply composer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub thread_id: ThreadId,
    /// Values found in this message only
    pub extracted: ExtractedValues,
    pub filled: Vec<SlotId>,
    pub missing: Vec<Slot>,
    pub next_prompt: Option<String>,
    pub criteria: CriteriaSet,
    pub records: Vec<Record>,
}

impl TurnOutcome {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnReply {
    pub outcome: TurnOutcome,
    pub reply: String,
}
