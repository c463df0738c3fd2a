pub mod conversation;
pub mod criteria_builder;
pub mod dialogue;
pub mod hybrid_search;
pub mod record_store;
pub mod retrieval;
pub mod slots;

pub use conversation::ConversationMemory;
pub use criteria_builder::CriteriaBuilder;
pub use dialogue::{DialogueOrchestrator, ReplyComposer, TemplateComposer, TurnOutcome};
pub use hybrid_search::{HybridQuery, HybridSearch};
pub use record_store::RecordStore;
pub use retrieval::{Embedder, HashEmbedder, TextRetrievalIndex};
pub use slots::SlotFillingEngine;
