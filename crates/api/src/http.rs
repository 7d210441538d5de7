//! # HTTP Response
//!
//! Converts handler results into HTTP responses with a JSON body. Errors are
//! serialized as-is, with the status code chosen by the error itself.

use bytes::Bytes;
use http::{StatusCode, header};
use http_body_util::Full;
use serde::Serialize;

use crate::api::Response;

/// Errors that know which HTTP status code best describes them.
pub trait HttpStatus {
    /// The status code to return for this error.
    fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

/// Trait for converting a `Result` into an HTTP response.
pub trait IntoHttp {
    /// Convert into an HTTP response.
    fn into_http(self) -> http::Response<Full<Bytes>>;
}

impl<T, E> IntoHttp for Result<Response<T>, E>
where
    T: Serialize,
    E: Serialize + HttpStatus,
{
    fn into_http(self) -> http::Response<Full<Bytes>> {
        let (status, body) = match self {
            Ok(r) => (r.status, serde_json::to_vec(&r.body)),
            Err(e) => (e.status(), serde_json::to_vec(&e)),
        };
        let (status, body) = match body {
            Ok(body) => (status, body),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string().into_bytes()),
        };

        http::Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body)))
            .unwrap_or_default()
    }
}
