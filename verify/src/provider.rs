//! # Verification Provider
//!
//! Implementers supply session storage and access to the verification
//! backend through the traits in this module. The library drives the session
//! protocol on top of them.

use std::future::Future;

use anyhow::Result;

pub use crate::state::Lifetime;
use crate::types::{Eviction, Session, SessionSnapshot, Transition};

/// Verifier Provider trait.
pub trait Provider: SessionStore + Backend + Clone {
    /// Session timeout and retention. Defaults to 5 minutes and 10 minutes.
    fn lifetime(&self) -> Lifetime {
        Lifetime::default()
    }
}

/// The `SessionStore` trait is implemented to provide storage of session
/// records between `start` and the final `check`.
///
/// Implementations must serialize `update` calls for the same session so
/// that concurrent transitions cannot interleave. Errors that describe the
/// session itself should be returned as the typed [`crate::Error`] values
/// (`NotFound`, `DuplicateId`, `InvalidTransition`) wrapped in
/// `anyhow::Error`.
pub trait SessionStore: Send + Sync {
    /// Insert a new session. Fails with `DuplicateId` if the identifier is
    /// already in use.
    fn create(&self, session: Session) -> impl Future<Output = Result<()>> + Send;

    /// Retrieve a session. Fails with `NotFound` if the session is unknown
    /// or has been evicted.
    fn get(&self, id: &str) -> impl Future<Output = Result<Session>> + Send;

    /// Atomically apply `transition` to the session (see [`Session::apply`])
    /// and return the updated record.
    fn update(
        &self, id: &str, transition: Transition,
    ) -> impl Future<Output = Result<Session>> + Send;

    /// Remove a session. Removing an unknown session is not an error.
    fn purge(&self, id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Remove every session that [`Session::is_evictable`] under `eviction`,
    /// returning the number removed.
    fn evict(&self, eviction: Eviction) -> impl Future<Output = Result<usize>> + Send;
}

/// The verification backend is the system of record for whether a holder
/// has presented a credential and whether it verified. The library only
/// reads from it.
pub trait Backend: Send + Sync {
    /// Ask the backend to open a presentation request for session `id`,
    /// returning the link the holder should follow.
    fn allocate(&self, verifier: &str, id: &str) -> impl Future<Output = Result<String>> + Send;

    /// The backend's current view of session `id`.
    fn status(
        &self, verifier: &str, id: &str,
    ) -> impl Future<Output = Result<SessionSnapshot>> + Send;
}
