use std::{
    collections::{HashMap, hash_map::Entry},
    sync::{Arc, RwLock},
};

use flock_commands::{SessionBrief, SessionStatusSource};

use crate::manager::{SessionHandle, SessionManager};

/// Process-wide table of active session managers.
///
/// Constructed once at startup and handed to collaborators explicitly;
/// there is no ambient global. A session id is present here iff its
/// manager is in a non-stopped state.
#[derive(Default)]
pub struct SessionRegistry {
    inner: RwLock<HashMap<String, Arc<SessionManager>>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a manager under its session id. Returns `false` when the
    /// id was already present; the existing entry is kept.
    pub(crate) fn insert(&self, manager: Arc<SessionManager>) -> bool {
        let mut inner = self.inner.write().unwrap();
        match inner.entry(manager.session_id().to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(manager);
                true
            },
        }
    }

    /// Deregister a session. Returns whether an entry was removed.
    pub(crate) fn remove(&self, session_id: &str) -> bool {
        self.inner.write().unwrap().remove(session_id).is_some()
    }

    #[must_use]
    pub fn get(&self, session_id: &str) -> Option<Arc<SessionManager>> {
        self.inner.read().unwrap().get(session_id).cloned()
    }

    #[must_use]
    pub fn contains(&self, session_id: &str) -> bool {
        self.inner.read().unwrap().contains_key(session_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().is_empty()
    }

    /// Snapshots of all active sessions, sorted by id for stable output.
    #[must_use]
    pub fn list(&self) -> Vec<SessionHandle> {
        let mut handles: Vec<SessionHandle> = self
            .inner
            .read()
            .unwrap()
            .values()
            .map(|m| m.handle())
            .collect();
        handles.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        handles
    }

    /// Stop and deregister one session. Returns whether it existed.
    pub async fn stop(&self, session_id: &str) -> bool {
        match self.get(session_id) {
            Some(manager) => {
                manager.stop().await;
                true
            },
            None => false,
        }
    }
}

impl SessionStatusSource for SessionRegistry {
    fn sessions(&self) -> Vec<SessionBrief> {
        self.list()
            .into_iter()
            .map(|h| SessionBrief {
                session_id: h.session_id,
                state: h.state.to_string(),
                started_at_ms: h.started_at_ms,
                reconnect_attempts: h.reconnect_attempts,
            })
            .collect()
    }
}
