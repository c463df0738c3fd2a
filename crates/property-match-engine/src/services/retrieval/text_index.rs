use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::FieldMapping;
use crate::models::Record;

use super::embedder::Embedder;

/// Relevance floor used when none is configured
pub const RELEVANCE_FLOOR_DEFAULT: f32 = 0.1;

/// Candidate with its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: Record,
    pub score: f32,
}

/// Listing embeddings keyed by record identifier.
///
/// Built wholesale by `initialize`; the map is swapped in under a short
/// write lock once complete.
pub struct TextRetrievalIndex {
    embedder: Arc<dyn Embedder>,
    fields: FieldMapping,
    relevance_floor: f32,
    embeddings: RwLock<Option<Arc<HashMap<String, Vec<f32>>>>>,
}

impl TextRetrievalIndex {
    pub fn new(embedder: Arc<dyn Embedder>, fields: FieldMapping, relevance_floor: f32) -> Self {
        Self {
            embedder,
            fields,
            relevance_floor,
            embeddings: RwLock::new(None),
        }
    }

    /// Description text: name, location, features, layout and up to three
    /// stations, skipping absent or blank fields.
    pub fn describe(&self, record: &Record) -> String {
        self.fields
            .description_fields()
            .into_iter()
            .filter_map(|field| record.get(field))
            .filter(|value| !value.is_blank())
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Rebuild the index. Records without an identifier or description are
    /// skipped; they stay filterable in the record store.
    pub fn initialize(&self, records: &[Record]) -> usize {
        let mut next = HashMap::with_capacity(records.len());
        let mut skipped = 0usize;

        for record in records {
            let Some(id) = record.identifier(&self.fields) else {
                skipped += 1;
                continue;
            };
            let description = self.describe(record);
            if description.is_empty() {
                skipped += 1;
                continue;
            }
            next.insert(id, self.embedder.embed(&description));
        }

        let indexed = next.len();
        *self.embeddings.write() = Some(Arc::new(next));

        if skipped > 0 {
            debug!("Skipped {} listings without identifier or description", skipped);
        }
        info!("Listing text index built: {} entries", indexed);
        indexed
    }

    pub fn is_ready(&self) -> bool {
        self.embeddings.read().is_some()
    }

    /// Score candidates against the query, best first.
    ///
    /// Candidates without a stored embedding are not scored. Ties keep the
    /// candidate order. Scores at or below the relevance floor are dropped,
    /// then at most `limit` results are returned.
    pub fn search_scored(
        &self,
        query: &str,
        candidates: &[Record],
        limit: usize,
    ) -> Vec<ScoredRecord> {
        let Some(embeddings) = self.embeddings.read().clone() else {
            warn!("Text index queried before initialization");
            return Vec::new();
        };

        let query_embedding = self.embedder.embed(query);

        let mut scored: Vec<ScoredRecord> = candidates
            .iter()
            .filter_map(|record| {
                let id = record.identifier(&self.fields)?;
                let embedding = embeddings.get(&id)?;
                Some(ScoredRecord {
                    record: record.clone(),
                    score: self.embedder.similarity(&query_embedding, embedding),
                })
            })
            .collect();

        // sort_by is stable: equal scores keep candidate order
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let results: Vec<ScoredRecord> = scored
            .into_iter()
            .filter(|item| item.score > self.relevance_floor)
            .take(limit)
            .collect();

        debug!(
            "Text ranking kept {} of {} candidates (floor {})",
            results.len(),
            candidates.len(),
            self.relevance_floor
        );
        results
    }

    pub fn search(&self, query: &str, candidates: &[Record], limit: usize) -> Vec<Record> {
        self.search_scored(query, candidates, limit)
            .into_iter()
            .map(|item| item.record)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::retrieval::embedder::HashEmbedder;

    fn index() -> TextRetrievalIndex {
        TextRetrievalIndex::new(
            Arc::new(HashEmbedder::default()),
            FieldMapping::default(),
            RELEVANCE_FLOOR_DEFAULT,
        )
    }

    fn listing(id: &str, name: &str, features: &str) -> Record {
        Record::new()
            .with("物件ID", id)
            .with("物件名称", name)
            .with("物件の特徴", features)
    }

    fn listings() -> Vec<Record> {
        vec![
            listing("A1", "Sunny Maison", "pets allowed balcony parking"),
            listing("A2", "Harbor Tower", "gym concierge rooftop lounge"),
            listing("A3", "Garden Court", "parking garden quiet street"),
        ]
    }

    #[test]
    fn test_describe_joins_fields_in_order() {
        let idx = index();
        let record = Record::new()
            .with("物件ID", "X")
            .with("駅1", "新宿駅")
            .with("物件名称", "メゾン")
            .with("所在地名称", "東京都新宿区")
            .with("物件の特徴", "");
        assert_eq!(idx.describe(&record), "メゾン 東京都新宿区 新宿駅");
    }

    #[test]
    fn test_uninitialized_index_returns_empty() {
        let idx = index();
        assert!(!idx.is_ready());
        assert!(idx.search("parking", &listings(), 5).is_empty());
    }

    #[test]
    fn test_records_without_identifier_are_not_indexed() {
        let idx = index();
        let mut records = listings();
        records.push(Record::new().with("物件名称", "Nameless Parking Lot"));
        assert_eq!(idx.initialize(&records), 3);

        let results = idx.search("nameless parking lot", &records, 10);
        assert!(results.iter().all(|r| r.identifier(&FieldMapping::default()).is_some()));
    }

    #[test]
    fn test_identical_description_ranks_first() {
        let idx = index();
        let records = listings();
        idx.initialize(&records);

        let query = idx.describe(&records[1]);
        let scored = idx.search_scored(&query, &records, 3);
        assert_eq!(scored[0].record.text("物件ID").as_deref(), Some("A2"));
        assert!((scored[0].score - 1.0).abs() < 1e-5);
        assert!(scored.iter().all(|s| (-1.0..=1.0).contains(&s.score)));
    }

    #[test]
    fn test_results_respect_floor_and_limit() {
        let idx = index();
        let records = listings();
        idx.initialize(&records);

        let scored = idx.search_scored("parking", &records, 1);
        assert!(scored.len() <= 1);
        assert!(scored.iter().all(|s| s.score > RELEVANCE_FLOOR_DEFAULT));

        assert!(idx.search("zzzz qqqq", &[], 5).is_empty());
    }

    #[test]
    fn test_ties_keep_candidate_order() {
        let idx = index();
        let records = vec![
            listing("T1", "Twin House", "parking"),
            listing("T2", "Twin House", "parking"),
        ];
        idx.initialize(&records);

        let results = idx.search("twin house parking", &records, 5);
        let ids: Vec<_> = results.iter().filter_map(|r| r.text("物件ID")).collect();
        assert_eq!(ids, vec!["T1", "T2"]);

        let reversed: Vec<Record> = records.into_iter().rev().collect();
        let results = idx.search("twin house parking", &reversed, 5);
        let ids: Vec<_> = results.iter().filter_map(|r| r.text("物件ID")).collect();
        assert_eq!(ids, vec!["T2", "T1"]);
    }
}
