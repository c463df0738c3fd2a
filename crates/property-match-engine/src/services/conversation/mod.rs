//! Conversation memory
//!
//! Per-thread message logs and preference maps held in a DashMap, one
//! mutex per thread, plus the process-wide "current thread" pointer.

mod memory;
pub mod types;

pub use memory::ConversationMemory;
pub use types::{Preferences, ThreadState};
