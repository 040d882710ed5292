//! In-process session store for tests and local runs.

use super::{SessionStore, StoreError};
use crate::models::SessionRecord;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Session store backed by a shared in-memory map.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a session record, keyed by its id.
    pub fn insert(&self, record: SessionRecord) {
        self.sessions
            .write()
            .insert(record.session_id.clone(), record);
    }

    /// Remove a session record. Returns true if one was present.
    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions.write().remove(session_id).is_some()
    }
}

impl SessionStore for MemorySessionStore {
    async fn lookup(&self, session_id: &str) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self.sessions.read().get(session_id).cloned())
    }
}
