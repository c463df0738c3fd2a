use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::{CriteriaSet, Record};
use crate::services::record_store::RecordStore;
use crate::services::retrieval::TextRetrievalIndex;

#[derive(Debug, Clone, Default)]
pub struct HybridQuery {
    pub criteria: Option<CriteriaSet>,
    pub text: Option<String>,
    pub limit: usize,
}

impl HybridQuery {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn with_criteria(mut self, criteria: CriteriaSet) -> Self {
        self.criteria = Some(criteria);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Structured filtering followed by text ranking.
pub struct HybridSearch {
    store: Arc<RecordStore>,
    index: Arc<TextRetrievalIndex>,
}

impl HybridSearch {
    pub fn new(store: Arc<RecordStore>, index: Arc<TextRetrievalIndex>) -> Self {
        Self { store, index }
    }

    pub fn is_ready(&self) -> bool {
        self.store.is_ready() && self.index.is_ready()
    }

    /// Narrow by criteria (all records when absent or empty), then rank by
    /// text when given, otherwise keep store order. Returns at most `limit`.
    pub fn query(&self, query: &HybridQuery) -> Vec<Record> {
        if !self.is_ready() {
            warn!(
                "Hybrid search before initialization (store ready: {}, index ready: {})",
                self.store.is_ready(),
                self.index.is_ready()
            );
            return Vec::new();
        }

        let candidates = match &query.criteria {
            Some(criteria) if !criteria.is_empty() => self.store.search(criteria),
            _ => self.store.all(),
        };

        let results = match query.text.as_deref() {
            Some(text) => self.index.search(text, &candidates, query.limit),
            None => candidates.into_iter().take(query.limit).collect(),
        };

        debug!(
            "Hybrid search returned {} listings (text ranking: {})",
            results.len(),
            query.text.is_some()
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldMapping;
    use crate::models::Criterion;
    use crate::services::retrieval::{HashEmbedder, RELEVANCE_FLOOR_DEFAULT};

    fn listings() -> Vec<Record> {
        vec![
            Record::new()
                .with("物件ID", "1")
                .with("物件名称", "Park Side")
                .with("物件の特徴", "quiet park view")
                .with("賃料・価格", "90000"),
            Record::new()
                .with("物件ID", "2")
                .with("物件名称", "Station Front")
                .with("物件の特徴", "station access shopping")
                .with("賃料・価格", "130000"),
            Record::new()
                .with("物件ID", "3")
                .with("物件名称", "Park Terrace")
                .with("物件の特徴", "park garden terrace")
                .with("賃料・価格", "110000"),
        ]
    }

    fn search() -> HybridSearch {
        let store = Arc::new(RecordStore::new());
        let index = Arc::new(TextRetrievalIndex::new(
            Arc::new(HashEmbedder::default()),
            FieldMapping::default(),
            RELEVANCE_FLOOR_DEFAULT,
        ));
        let records = listings();
        index.initialize(&records);
        store.initialize(records);
        HybridSearch::new(store, index)
    }

    fn ids(records: &[Record]) -> Vec<String> {
        records.iter().filter_map(|r| r.text("物件ID")).collect()
    }

    #[test]
    fn test_unready_returns_empty() {
        let store = Arc::new(RecordStore::new());
        store.initialize(listings());
        let index = Arc::new(TextRetrievalIndex::new(
            Arc::new(HashEmbedder::default()),
            FieldMapping::default(),
            RELEVANCE_FLOOR_DEFAULT,
        ));
        let search = HybridSearch::new(store, index);
        assert!(search.query(&HybridQuery::new(5)).is_empty());
    }

    #[test]
    fn test_no_text_keeps_store_order_and_limit() {
        let search = search();
        assert_eq!(ids(&search.query(&HybridQuery::new(2))), vec!["1", "2"]);
    }

    #[test]
    fn test_criteria_narrow_candidates() {
        let search = search();
        let query = HybridQuery::new(5)
            .with_criteria(CriteriaSet::new().with("賃料・価格", Criterion::at_most(120000.0)))
            .with_text("park");
        let results = search.query(&query);
        assert!(!results.is_empty());
        assert!(!ids(&results).contains(&"2".to_string()));
    }

    #[test]
    fn test_empty_criteria_matches_direct_index_search() {
        let search = search();
        let direct = search.index.search("park garden", &listings(), 5);
        let hybrid = search.query(
            &HybridQuery::new(5)
                .with_criteria(CriteriaSet::new())
                .with_text("park garden"),
        );
        assert_eq!(hybrid, direct);
    }
}
