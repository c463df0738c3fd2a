//! Turn-level contract for the workflow runner
//!
//! `DialogueOrchestrator` wires memory, slot filling, criteria derivation
//! and hybrid search; `ReplyComposer` is the seam for reply generation.

pub mod composer;
mod orchestrator;
pub mod types;

pub use composer::{ReplyComposer, TemplateComposer, NO_MATCH_REPLY};
pub use orchestrator::DialogueOrchestrator;
pub use types::{LoadSummary, TurnOutcome, TurnReply};
