//! # Start Handler
//!
//! Starts a verification session. The verification backend opens a
//! presentation request and returns the link the holder follows to respond;
//! the session is recorded as `initiated` until the backend reports progress.

use chrono::Utc;
use credibil_verify_api::{Body, Handler, Response};

use crate::generate;
use crate::handlers::{Error, Result};
use crate::provider::{Backend, Provider, SessionStore};
use crate::types::{Session, StartRequest, StartResponse};

/// Create a session and its holder link.
///
/// # Errors
///
/// Returns `Error::BackendUnavailable` if the backend cannot allocate the
/// session. Failures are not retried.
async fn start(
    verifier: &str, provider: &impl Provider, _request: StartRequest,
) -> Result<StartResponse> {
    let id = generate::session_id();

    let session_link = Backend::allocate(provider, verifier, &id).await.map_err(|e| {
        tracing::warn!(id = %id, "backend could not allocate session: {e:#}");
        Error::BackendUnavailable(format!("issue allocating session: {e:#}"))
    })?;

    let session = Session::new(&id, &session_link, Utc::now());
    SessionStore::create(provider, session).await?;
    tracing::debug!(id = %id, "session initiated");

    Ok(StartResponse { session_link, id })
}

impl<P: Provider> Handler<StartResponse, P> for StartRequest {
    type Error = Error;

    async fn handle(self, verifier: &str, provider: &P) -> Result<Response<StartResponse>> {
        Ok(Response::created(start(verifier, provider, self).await?))
    }
}

impl Body for StartRequest {}
