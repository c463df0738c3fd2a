use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use super::types::{Preferences, ThreadState};
use crate::models::{ChatMessage, Role, ThreadId};
use crate::utils::error::{EngineError, EngineResult};

type SharedThread = Arc<Mutex<ThreadState>>;

/// Thread-safe in-memory conversation store.
///
/// Each thread id owns its own mutex, so writers on different threads never
/// contend and writers on the same thread are serialized.
#[derive(Default)]
pub struct ConversationMemory {
    threads: DashMap<ThreadId, SharedThread>,
    current: RwLock<Option<ThreadId>>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the thread if unseen and make it current.
    pub fn set_thread(&self, thread_id: &str) {
        self.thread(thread_id);
        *self.current.write() = Some(thread_id.to_string());
        info!("Current thread set to {}", thread_id);
    }

    pub fn current_thread(&self) -> Option<ThreadId> {
        self.current.read().clone()
    }

    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    /// Explicit id wins, then the current thread.
    pub fn resolve(&self, thread_id: Option<&str>) -> Option<ThreadId> {
        match thread_id {
            Some(id) => Some(id.to_string()),
            None => self.current_thread(),
        }
    }

    fn thread(&self, thread_id: &str) -> SharedThread {
        if let Some(existing) = self.threads.get(thread_id) {
            return existing.value().clone();
        }
        self.threads
            .entry(thread_id.to_string())
            .or_insert_with(|| {
                debug!("Creating thread {}", thread_id);
                Arc::new(Mutex::new(ThreadState::new()))
            })
            .value()
            .clone()
    }

    fn existing(&self, thread_id: Option<&str>) -> Option<SharedThread> {
        let id = self.resolve(thread_id)?;
        self.threads.get(&id).map(|entry| entry.value().clone())
    }

    /// Run `f` under the resolved thread's lock, creating the thread if needed.
    pub fn update<R>(
        &self,
        thread_id: Option<&str>,
        f: impl FnOnce(&mut ThreadState) -> R,
    ) -> EngineResult<R> {
        let id = self.resolve(thread_id).ok_or(EngineError::NoThreadSelected)?;
        let shared = self.thread(&id);
        let mut state = shared.lock();
        state.touch();
        Ok(f(&mut state))
    }

    /// Read the resolved thread; `None` when unresolvable or never created.
    pub fn read<R>(&self, thread_id: Option<&str>, f: impl FnOnce(&ThreadState) -> R) -> Option<R> {
        let shared = self.existing(thread_id)?;
        let state = shared.lock();
        Some(f(&state))
    }

    pub fn add_message(
        &self,
        role: Role,
        content: impl Into<String>,
        thread_id: Option<&str>,
    ) -> EngineResult<()> {
        let message = ChatMessage::new(role, content);
        self.update(thread_id, |state| state.messages.push(message))
    }

    /// Copy of the message log in arrival order.
    pub fn get_messages(&self, thread_id: Option<&str>) -> Vec<ChatMessage> {
        self.read(thread_id, |state| state.messages.clone())
            .unwrap_or_default()
    }

    pub fn clear_messages(&self, thread_id: Option<&str>) -> EngineResult<()> {
        self.update(thread_id, |state| state.messages.clear())
    }

    pub fn save_preference(
        &self,
        key: impl Into<String>,
        value: Value,
        thread_id: Option<&str>,
    ) -> EngineResult<()> {
        let key = key.into();
        self.update(thread_id, |state| {
            state.preferences.insert(key, value);
        })
    }

    /// Write several preferences under one lock acquisition.
    pub fn save_preferences(
        &self,
        values: impl IntoIterator<Item = (String, Value)>,
        thread_id: Option<&str>,
    ) -> EngineResult<usize> {
        self.update(thread_id, |state| {
            let mut written = 0;
            for (key, value) in values {
                state.preferences.insert(key, value);
                written += 1;
            }
            written
        })
    }

    pub fn get_preference(&self, key: &str, thread_id: Option<&str>) -> Option<Value> {
        self.read(thread_id, |state| state.preferences.get(key).cloned())
            .flatten()
    }

    /// Copy of the whole preference map.
    pub fn get_all_preferences(&self, thread_id: Option<&str>) -> Preferences {
        self.read(thread_id, |state| state.preferences.clone())
            .unwrap_or_default()
    }

    pub fn clear_preferences(&self, thread_id: Option<&str>) -> EngineResult<()> {
        self.update(thread_id, |state| state.preferences.clear())
    }
}
