//! # Check Handler
//!
//! Reports the current state of a session. For unresolved sessions the
//! backend's view is read through and any progress it reports is recorded in
//! the session store before the snapshot is returned.

use chrono::Utc;
use credibil_verify_api::{Body, Handler, Response};

use crate::handlers::{Error, Result};
use crate::provider::{Backend, Provider, SessionStore};
use crate::types::{CheckRequest, Session, SessionSnapshot, Status, Transition};

/// Return the session's status and, once verified, its presentation.
///
/// # Errors
///
/// Returns `Error::NotFound` for unknown or evicted sessions,
/// `Error::BackendUnavailable` when the backend cannot be read, and
/// `Error::InvalidTransition` when the backend reports a status the session
/// cannot move to.
async fn check(
    verifier: &str, provider: &impl Provider, request: CheckRequest,
) -> Result<SessionSnapshot> {
    let session = SessionStore::get(provider, &request.id).await?;
    if session.status.is_terminal() {
        return Ok(session.snapshot());
    }

    let now = Utc::now();
    if session.is_timed_out(now, provider.lifetime().timeout()) {
        tracing::debug!(id = %session.id, "session timed out");
        let expired = record(provider, &session.id, Transition::to(Status::Expired).at(now)).await?;
        return Ok(expired.snapshot());
    }

    let reported = Backend::status(provider, verifier, &session.id).await.map_err(|e| {
        Error::BackendUnavailable(format!("issue reading status of session {}: {e:#}", session.id))
    })?;
    if reported.status == session.status {
        return Ok(session.snapshot());
    }

    // stage the whole path so a report that fails part way commits nothing
    let transitions: Vec<Transition> = session
        .status
        .path_to(reported.status)
        .into_iter()
        .map(|status| Transition {
            status,
            presentation: if status == Status::Verified {
                reported.presentation.clone()
            } else {
                None
            },
            at: now,
        })
        .collect();

    let mut staged = session.clone();
    for transition in &transitions {
        if let Err(e) = staged.apply(transition.clone()) {
            let reason = e.description();
            tracing::error!(id = %session.id, "backend reported an invalid transition: {reason}");
            return Err(e);
        }
    }

    let mut current = session;
    for transition in transitions {
        let status = transition.status;
        current = record(provider, &current.id, transition).await?;
        tracing::debug!(id = %current.id, %status, "session updated");
    }

    Ok(current.snapshot())
}

// Apply a transition, logging any inconsistency between store and backend.
async fn record(provider: &impl Provider, id: &str, transition: Transition) -> Result<Session> {
    SessionStore::update(provider, id, transition).await.map_err(|e| {
        let err = Error::from(e);
        if let Error::InvalidTransition(reason) = &err {
            tracing::error!(id, "backend reported an invalid transition: {reason}");
        }
        err
    })
}

impl<P: Provider> Handler<SessionSnapshot, P> for CheckRequest {
    type Error = Error;

    async fn handle(self, verifier: &str, provider: &P) -> Result<Response<SessionSnapshot>> {
        Ok(check(verifier, provider, self).await?.into())
    }
}

impl Body for CheckRequest {}
