//! # API
//!
//! Session requests are plain bodies that know how to handle themselves
//! against a provider. Handlers wrap their result in a [`Response`] that
//! carries the status code an HTTP front end should use.

use std::fmt::Debug;
use std::ops::Deref;

use http::StatusCode;

/// A session response and the status code describing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response<T> {
    /// `200 OK` for reads, `201 Created` when a session was created.
    pub status: StatusCode,

    /// The handler's result.
    pub body: T,
}

impl<T> Response<T> {
    /// A response for a newly created resource.
    pub const fn created(body: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            body,
        }
    }

    /// Discard the status, keeping the body.
    pub fn into_body(self) -> T {
        self.body
    }
}

impl<T> From<T> for Response<T> {
    fn from(body: T) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }
}

impl<T> Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.body
    }
}

/// Implemented by each request body to run its operation for `verifier`
/// using `provider`.
pub trait Handler<U, P>: Body {
    /// The error type returned by the handler.
    type Error;

    /// Process the request.
    fn handle(
        self, verifier: &str, provider: &P,
    ) -> impl Future<Output = Result<Response<U>, Self::Error>> + Send;
}

/// Marker for request bodies.
pub trait Body: Clone + Debug + Send + Sync {}
