//! # Endpoint
//!
//! `Endpoint` provides the entry point for the verification session API.
//! Requests are routed to the appropriate handler for processing, returning
//! a response that can be serialized to JSON or directly to HTTP (using the
//! [`crate::http::IntoHttp`] trait).

mod check;
mod start;
mod sweep;

pub use credibil_verify_api::{Body, Handler, Response};
use tracing::instrument;

pub use self::sweep::sweep;
pub use crate::error::Error;
use crate::provider::Provider;
use crate::types::{CheckRequest, SessionSnapshot, StartRequest, StartResponse};

/// Result type for verification sessions.
pub type Result<T, E = Error> = anyhow::Result<T, E>;

/// Handle incoming verification session requests.
///
/// # Errors
///
/// This method can fail for a number of reasons related to the incoming
/// message's viability. Expected failures include an unavailable backend,
/// unknown sessions, and inconsistent status reports from the backend.
///
/// Implementers should look to the Error type and description for more
/// information on the reason for failure.
#[instrument(level = "debug", skip(provider))]
pub async fn handle<B, P, U>(verifier: &str, request: B, provider: &P) -> Result<Response<U>>
where
    B: Handler<U, P, Error = Error>,
    P: Provider,
{
    request.handle(verifier, provider).await
}

/// An API `Client` bound to a verifier and its provider.
///
/// The client owns a clone of the provider so it can be moved into a
/// spawned polling task.
#[derive(Clone, Debug)]
pub struct Client<P: Provider> {
    verifier: String,
    provider: P,
}

impl<P: Provider> Client<P> {
    /// Create a new `Client`.
    #[must_use]
    pub fn new(verifier: impl Into<String>, provider: P) -> Self {
        Self {
            verifier: verifier.into(),
            provider,
        }
    }

    /// The verifier this client acts for.
    #[must_use]
    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    /// The client's provider.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Process a request.
    ///
    /// # Errors
    ///
    /// Will fail if request cannot be processed.
    pub async fn handle<B, U>(&self, request: B) -> Result<Response<U>>
    where
        B: Handler<U, P, Error = Error>,
    {
        self::handle(&self.verifier, request, &self.provider).await
    }

    /// Start a new verification session.
    ///
    /// # Errors
    ///
    /// Returns `Error::BackendUnavailable` if the backend cannot allocate a
    /// session.
    pub async fn start(&self) -> Result<StartResponse> {
        Ok(self.handle(StartRequest).await?.body)
    }

    /// The current state of session `id`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the session is unknown or evicted.
    pub async fn check(&self, id: &str) -> Result<SessionSnapshot> {
        Ok(self.handle(CheckRequest::new(id)).await?.body)
    }
}
