//! Slot filling
//!
//! Six required slots (budget, area, layout, station distance, size,
//! features), regex extraction from user messages, and per-thread fill
//! status derived from stored preferences.

pub mod catalog;
mod engine;
pub mod extractor;

pub use catalog::{is_filled, Slot, SlotId, SlotSuggestion, SLOT_CATALOG};
pub use engine::{ExtractionResult, SlotFillingEngine, SlotStatus};
pub use extractor::{ExtractedValues, SlotExtractor};
