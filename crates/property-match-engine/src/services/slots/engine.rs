use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::catalog::{is_filled, suggestion_for, Slot, SlotId, SlotSuggestion, SLOT_CATALOG};
use super::extractor::{ExtractedValues, SlotExtractor};
use crate::services::conversation::ConversationMemory;
use crate::utils::error::EngineError;

/// Fill status of the required slots for one thread
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotStatus {
    pub filled: Vec<SlotId>,
    /// Catalog order
    pub missing: Vec<Slot>,
    /// Prompt of the first missing slot
    pub next_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub extracted: ExtractedValues,
    pub detected: Vec<SlotId>,
    /// False when no thread could be resolved to store the values in
    pub persisted: bool,
}

/// Tracks which required slots a thread has filled and fills them from
/// free-form messages.
pub struct SlotFillingEngine {
    memory: Arc<ConversationMemory>,
}

impl SlotFillingEngine {
    pub fn new(memory: Arc<ConversationMemory>) -> Self {
        Self { memory }
    }

    pub fn check_slots(&self, thread_id: Option<&str>) -> SlotStatus {
        let preferences = self.memory.get_all_preferences(thread_id);

        let (filled, missing): (Vec<Slot>, Vec<Slot>) = SLOT_CATALOG
            .iter()
            .partition(|slot| preferences.get(slot.id.as_str()).is_some_and(is_filled));

        let next_prompt = missing.first().map(|slot| slot.prompt.to_string());

        debug!(
            "Slot status: {} filled, {} missing",
            filled.len(),
            missing.len()
        );

        SlotStatus {
            filled: filled.into_iter().map(|slot| slot.id).collect(),
            missing,
            next_prompt,
        }
    }

    /// Extract slot values and store them in the resolved thread's
    /// preferences under one lock. Values are returned even when no thread
    /// resolves; they are just not remembered.
    pub fn extract_slot_values(&self, message: &str, thread_id: Option<&str>) -> ExtractionResult {
        let extracted = SlotExtractor::extract(message);
        let detected = extracted.detected();

        if detected.is_empty() {
            return ExtractionResult {
                extracted,
                detected,
                persisted: false,
            };
        }

        let preferences = extracted
            .to_preferences()
            .into_iter()
            .map(|(id, value)| (id.as_str().to_string(), value));

        let persisted = match self.memory.save_preferences(preferences, thread_id) {
            Ok(written) => {
                info!("Stored {} slot values", written);
                true
            }
            Err(EngineError::NoThreadSelected) => {
                warn!("Slot values extracted without a thread; not stored");
                false
            }
            Err(e) => {
                warn!("Failed to store slot values: {}", e);
                false
            }
        };

        ExtractionResult {
            extracted,
            detected,
            persisted,
        }
    }

    /// Static options for each slot still missing, catalog order.
    pub fn suggest_slot_values(&self, thread_id: Option<&str>) -> BTreeMap<SlotId, SlotSuggestion> {
        self.check_slots(thread_id)
            .missing
            .iter()
            .map(|slot| (slot.id, suggestion_for(slot.id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine() -> (Arc<ConversationMemory>, SlotFillingEngine) {
        let memory = Arc::new(ConversationMemory::new());
        let engine = SlotFillingEngine::new(Arc::clone(&memory));
        (memory, engine)
    }

    #[test]
    fn test_unknown_thread_reports_everything_missing() {
        let (_, engine) = engine();
        let status = engine.check_slots(Some("nobody"));
        assert!(status.filled.is_empty());
        assert_eq!(status.missing.len(), 6);
        assert_eq!(status.next_prompt.as_deref(), Some(SLOT_CATALOG[0].prompt));

        let status = engine.check_slots(None);
        assert_eq!(status.missing.len(), 6);
    }

    #[test]
    fn test_extraction_persists_and_fills() {
        let (memory, engine) = engine();
        let result = engine.extract_slot_values("東京で10万円以内の1Kを探しています", Some("t1"));
        assert!(result.persisted);
        assert_eq!(
            result.detected,
            vec![SlotId::Budget, SlotId::Area, SlotId::Layout]
        );

        let status = engine.check_slots(Some("t1"));
        assert_eq!(
            status.filled,
            vec![SlotId::Budget, SlotId::Area, SlotId::Layout]
        );
        assert_eq!(status.next_prompt.as_deref(), Some(SLOT_CATALOG[3].prompt));
        assert_eq!(memory.get_preference("budget", Some("t1")), Some(json!(100000)));
    }

    #[test]
    fn test_extraction_without_thread_is_not_persisted() {
        let (memory, engine) = engine();
        let result = engine.extract_slot_values("15万円", None);
        assert_eq!(result.extracted.budget, Some(150000));
        assert!(!result.persisted);
        assert_eq!(memory.thread_count(), 0);
    }

    #[test]
    fn test_filled_slots_stay_filled() {
        let (memory, engine) = engine();
        engine.extract_slot_values("2LDKで", Some("t"));
        engine.extract_slot_values("特にありません", Some("t"));
        engine.extract_slot_values("大阪がいい", Some("t"));

        let status = engine.check_slots(Some("t"));
        assert!(status.filled.contains(&SlotId::Layout));
        assert!(status.filled.contains(&SlotId::Area));

        memory.clear_preferences(Some("t")).unwrap();
        assert!(engine.check_slots(Some("t")).filled.is_empty());
    }

    #[test]
    fn test_zero_counts_as_filled() {
        let (memory, engine) = engine();
        memory.save_preference("budget", json!(0), Some("t")).unwrap();
        memory.save_preference("features", json!([]), Some("t")).unwrap();

        let status = engine.check_slots(Some("t"));
        assert_eq!(status.filled, vec![SlotId::Budget]);
        assert!(status.missing.iter().any(|slot| slot.id == SlotId::Features));
    }

    #[test]
    fn test_suggestions_cover_only_missing_slots() {
        let (_, engine) = engine();
        engine.extract_slot_values("福岡で3LDK", Some("t"));

        let suggestions = engine.suggest_slot_values(Some("t"));
        let keys: Vec<_> = suggestions.keys().copied().collect();
        assert_eq!(
            keys,
            vec![
                SlotId::Budget,
                SlotId::StationDistance,
                SlotId::Size,
                SlotId::Features
            ]
        );
        assert!(suggestions[&SlotId::Budget].options.contains(&"10万円以内"));
    }
}
