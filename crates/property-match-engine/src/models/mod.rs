pub mod chat;
pub mod criteria;
pub mod record;

pub use chat::{ChatMessage, Role, ThreadId};
pub use criteria::{CriteriaSet, Criterion, OR_SEPARATOR};
pub use record::{FieldValue, Record};
