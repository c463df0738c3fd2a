use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::ChatMessage;

/// Preference key -> arbitrary JSON value
pub type Preferences = BTreeMap<String, serde_json::Value>;

/// Everything remembered for one conversation thread
#[derive(Debug, Clone, Serialize)]
pub struct ThreadState {
    /// Message log in arrival order
    pub messages: Vec<ChatMessage>,

    /// Values collected from the user (slot keys and caller-defined keys)
    pub preferences: Preferences,

    pub created_at: DateTime<Utc>,

    /// Updated on every write
    pub last_activity: DateTime<Utc>,
}

impl ThreadState {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            messages: Vec::new(),
            preferences: Preferences::new(),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

impl Default for ThreadState {
    fn default() -> Self {
        Self::new()
    }
}
