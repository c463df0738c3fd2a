use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::models::{CriteriaSet, Record};

/// In-memory listing store.
///
/// Records are held in an immutable snapshot; `initialize` builds a new
/// snapshot and swaps it in, so readers never see a half-replaced set.
#[derive(Default)]
pub struct RecordStore {
    snapshot: RwLock<Option<Arc<Vec<Record>>>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held record set and mark the store ready.
    pub fn initialize(&self, records: Vec<Record>) -> usize {
        let count = records.len();
        let next = Arc::new(records);
        *self.snapshot.write() = Some(next);
        info!("Record store initialized with {} listings", count);
        count
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot.read().is_some()
    }

    fn current(&self) -> Option<Arc<Vec<Record>>> {
        self.snapshot.read().clone()
    }

    /// Every record satisfying all criteria. An empty set returns everything;
    /// an uninitialized store returns nothing.
    pub fn search(&self, criteria: &CriteriaSet) -> Vec<Record> {
        let Some(records) = self.current() else {
            warn!("Record store queried before initialization");
            return Vec::new();
        };

        let results: Vec<Record> = records
            .iter()
            .filter(|record| criteria.matches(record))
            .cloned()
            .collect();

        debug!(
            "Structured search matched {}/{} listings ({} criteria)",
            results.len(),
            records.len(),
            criteria.len()
        );
        results
    }

    pub fn all(&self) -> Vec<Record> {
        self.current()
            .map(|records| records.as_ref().clone())
            .unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.current().map(|records| records.len()).unwrap_or(0)
    }
}
