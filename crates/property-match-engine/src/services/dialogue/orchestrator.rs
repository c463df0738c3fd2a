use std::sync::Arc;
use tracing::info;

use super::composer::ReplyComposer;
use super::types::{LoadSummary, TurnOutcome, TurnReply};
use crate::config::Settings;
use crate::models::{CriteriaSet, Record, Role};
use crate::services::conversation::ConversationMemory;
use crate::services::criteria_builder::CriteriaBuilder;
use crate::services::hybrid_search::{HybridQuery, HybridSearch};
use crate::services::record_store::RecordStore;
use crate::services::retrieval::{Embedder, HashEmbedder, TextRetrievalIndex};
use crate::services::slots::{ExtractionResult, SlotFillingEngine, SlotStatus};
use crate::utils::error::EngineResult;

/// Service context for one engine instance.
///
/// Owns the memory, store and index; every turn operation takes an explicit
/// thread id and works on in-memory state only.
pub struct DialogueOrchestrator {
    settings: Settings,
    memory: Arc<ConversationMemory>,
    store: Arc<RecordStore>,
    index: Arc<TextRetrievalIndex>,
    slots: SlotFillingEngine,
    search: HybridSearch,
}

impl DialogueOrchestrator {
    pub fn new(settings: Settings) -> Self {
        let embedder = Arc::new(HashEmbedder::new(settings.engine.embedding_dimension));
        Self::with_embedder(settings, embedder)
    }

    pub fn with_embedder(settings: Settings, embedder: Arc<dyn Embedder>) -> Self {
        let memory = Arc::new(ConversationMemory::new());
        let store = Arc::new(RecordStore::new());
        let index = Arc::new(TextRetrievalIndex::new(
            embedder,
            settings.fields.clone(),
            settings.engine.relevance_floor,
        ));

        Self {
            slots: SlotFillingEngine::new(Arc::clone(&memory)),
            search: HybridSearch::new(Arc::clone(&store), Arc::clone(&index)),
            settings,
            memory,
            store,
            index,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn memory(&self) -> &Arc<ConversationMemory> {
        &self.memory
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    pub fn index(&self) -> &Arc<TextRetrievalIndex> {
        &self.index
    }

    pub fn slots(&self) -> &SlotFillingEngine {
        &self.slots
    }

    /// Initialize the store and the index from the same listing set.
    pub fn load_listings(&self, records: Vec<Record>) -> LoadSummary {
        let indexed = self.index.initialize(&records);
        let stored = self.store.initialize(records);
        info!("Loaded {} listings ({} indexed)", stored, indexed);
        LoadSummary { stored, indexed }
    }

    pub fn extract_and_persist(&self, thread_id: &str, message: &str) -> ExtractionResult {
        self.slots.extract_slot_values(message, Some(thread_id))
    }

    pub fn slot_status(&self, thread_id: &str) -> SlotStatus {
        self.slots.check_slots(Some(thread_id))
    }

    pub fn derive_criteria(&self, thread_id: &str) -> CriteriaSet {
        let preferences = self.memory.get_all_preferences(Some(thread_id));
        CriteriaBuilder::new(&self.settings.fields).build(&preferences)
    }

    pub fn search(&self, criteria: CriteriaSet, text: &str, limit: usize) -> Vec<Record> {
        let mut query = HybridQuery::new(limit).with_criteria(criteria);
        if !text.trim().is_empty() {
            query = query.with_text(text);
        }
        self.search.query(&query)
    }

    /// Record the message, fill slots, derive criteria and search.
    pub fn run_turn(&self, thread_id: &str, message: &str) -> EngineResult<TurnOutcome> {
        self.memory.add_message(Role::User, message, Some(thread_id))?;

        let extraction = self.extract_and_persist(thread_id, message);
        let status = self.slot_status(thread_id);
        let criteria = self.derive_criteria(thread_id);
        let records = self.search(criteria.clone(), message, self.settings.engine.default_limit);

        info!(
            "Turn on {}: detected {:?}, {} slots missing, {} criteria, {} listings",
            thread_id,
            extraction.detected,
            status.missing.len(),
            criteria.len(),
            records.len()
        );

        Ok(TurnOutcome {
            thread_id: thread_id.to_string(),
            extracted: extraction.extracted,
            filled: status.filled,
            missing: status.missing,
            next_prompt: status.next_prompt,
            criteria,
            records,
        })
    }

    /// `run_turn`, then compose a reply and store it as the assistant message.
    pub async fn respond(
        &self,
        thread_id: &str,
        message: &str,
        composer: &dyn ReplyComposer,
    ) -> EngineResult<TurnReply> {
        let outcome = self.run_turn(thread_id, message)?;
        let history = self.memory.get_messages(Some(thread_id));

        let reply = composer.compose(&outcome, &history).await?;
        self.memory
            .add_message(Role::Assistant, reply.clone(), Some(thread_id))?;

        Ok(TurnReply { outcome, reply })
    }
}
