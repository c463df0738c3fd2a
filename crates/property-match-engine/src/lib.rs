//! Conversational intake and retrieval for rental listings.
//!
//! A user states preferences over several turns; the engine tracks which
//! required slots are known, extracts values from free text, filters
//! listings by the derived criteria and ranks them by text similarity.

pub mod config;
pub mod ingestion;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::config::Settings;
pub use models::{ChatMessage, CriteriaSet, Criterion, FieldValue, Record, Role};
pub use services::{
    ConversationMemory, DialogueOrchestrator, HybridQuery, HybridSearch, RecordStore,
    ReplyComposer, SlotFillingEngine, TemplateComposer, TextRetrievalIndex, TurnOutcome,
};
pub use utils::{EngineError, EngineResult};
