use anyhow::Result;
use credibil_verify::provider::{Backend, Lifetime, Provider, SessionStore};
use credibil_verify::store::MemoryStore;
use credibil_verify::{Eviction, Session, SessionSnapshot, Transition};

use crate::backend::MockBackend;

pub const VERIFIER_ID: &str = "http://localhost:8080";

#[derive(Clone, Debug, Default)]
pub struct Verifier {
    store: MemoryStore,
    backend: MockBackend,
    lifetime: Lifetime,
}

impl Verifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    #[must_use]
    pub const fn backend(&self) -> &MockBackend {
        &self.backend
    }

    #[must_use]
    pub const fn store(&self) -> &MemoryStore {
        &self.store
    }
}

impl Provider for Verifier {
    fn lifetime(&self) -> Lifetime {
        self.lifetime
    }
}

impl SessionStore for Verifier {
    async fn create(&self, session: Session) -> Result<()> {
        self.store.create(session).await
    }

    async fn get(&self, id: &str) -> Result<Session> {
        self.store.get(id).await
    }

    async fn update(&self, id: &str, transition: Transition) -> Result<Session> {
        self.store.update(id, transition).await
    }

    async fn purge(&self, id: &str) -> Result<()> {
        self.store.purge(id).await
    }

    async fn evict(&self, eviction: Eviction) -> Result<usize> {
        self.store.evict(eviction).await
    }
}

impl Backend for Verifier {
    async fn allocate(&self, verifier: &str, id: &str) -> Result<String> {
        self.backend.allocate(verifier, id).await
    }

    async fn status(&self, verifier: &str, id: &str) -> Result<SessionSnapshot> {
        self.backend.status(verifier, id).await
    }
}
