//! # In-Memory Session Store

use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::Error;
use crate::provider::SessionStore;
use crate::types::{Eviction, Session, Transition};

/// A [`SessionStore`] backed by a concurrent map.
///
/// Updates hold the entry's shard lock while the transition is validated and
/// applied, so transitions for one session are serialized. Clones share the
/// same underlying map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    sessions: Arc<DashMap<String, Session>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if the store holds no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for MemoryStore {
    async fn create(&self, session: Session) -> Result<()> {
        match self.sessions.entry(session.id.clone()) {
            Entry::Occupied(_) => Err(Error::DuplicateId(session.id).into()),
            Entry::Vacant(entry) => {
                entry.insert(session);
                Ok(())
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Session> {
        let Some(session) = self.sessions.get(id) else {
            return Err(Error::NotFound(format!("session {id}")).into());
        };
        Ok(session.clone())
    }

    async fn update(&self, id: &str, transition: Transition) -> Result<Session> {
        let Some(mut session) = self.sessions.get_mut(id) else {
            return Err(Error::NotFound(format!("session {id}")).into());
        };
        session.apply(transition)?;
        Ok(session.clone())
    }

    async fn purge(&self, id: &str) -> Result<()> {
        self.sessions.remove(id);
        Ok(())
    }

    async fn evict(&self, eviction: Eviction) -> Result<usize> {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_evictable(&eviction));
        Ok(before.saturating_sub(self.sessions.len()))
    }
}
