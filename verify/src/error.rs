//! # Verification Errors
//!
//! This module defines the errors returned by the session protocol, the
//! session store, the token decoder, and the polling client.

use credibil_verify_api::http::HttpStatus;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for credential verification sessions.
///
/// Errors serialize to an OAuth-style `error`/`error_description` pair so
/// they can be returned to remote callers and decoded again on the other
/// side of the wire.
#[derive(Error, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "error", content = "error_description")]
pub enum Error {
    /// The verification backend could not allocate (or report on) a session.
    #[error(r#"{{"error": "backend_unavailable", "error_description": "{0}"}}"#)]
    BackendUnavailable(String),

    /// The session is unknown or has been evicted.
    #[error(r#"{{"error": "not_found", "error_description": "{0}"}}"#)]
    NotFound(String),

    /// A session with the same identifier already exists.
    #[error(r#"{{"error": "duplicate_id", "error_description": "{0}"}}"#)]
    DuplicateId(String),

    /// The requested status change is not an edge of the session lifecycle.
    #[error(r#"{{"error": "invalid_transition", "error_description": "{0}"}}"#)]
    InvalidTransition(String),

    /// A credential token could not be decoded.
    #[error(r#"{{"error": "malformed_token", "error_description": "{0}"}}"#)]
    MalformedToken(String),

    /// The session resolved to `failed`.
    #[error(r#"{{"error": "verification_failed", "error_description": "{0}"}}"#)]
    VerificationFailed(String),

    /// The session resolved to `expired`.
    #[error(r#"{{"error": "verification_expired", "error_description": "{0}"}}"#)]
    VerificationExpired(String),

    /// Polling gave up after the configured number of attempts.
    #[error(r#"{{"error": "poll_timeout", "error_description": "{0}"}}"#)]
    PollTimeout(String),

    /// Polling was cancelled by the caller.
    #[error(r#"{{"error": "cancelled", "error_description": "{0}"}}"#)]
    Cancelled(String),

    /// A remote `check` failed in transit or returned an unreadable body.
    #[error(r#"{{"error": "transport", "error_description": "{0}"}}"#)]
    Transport(String),

    /// An unexpected condition prevented the request from being fulfilled.
    #[error(r#"{{"error": "server_error", "error_description": "{0}"}}"#)]
    ServerError(String),
}

impl Error {
    /// Whether a polling loop may retry after this error.
    ///
    /// Only failures of a single `check` round-trip are transient. Terminal
    /// outcomes and consistency errors are not.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::BackendUnavailable(_) | Self::ServerError(_))
    }

    /// The error description.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::BackendUnavailable(d)
            | Self::NotFound(d)
            | Self::DuplicateId(d)
            | Self::InvalidTransition(d)
            | Self::MalformedToken(d)
            | Self::VerificationFailed(d)
            | Self::VerificationExpired(d)
            | Self::PollTimeout(d)
            | Self::Cancelled(d)
            | Self::Transport(d)
            | Self::ServerError(d) => d,
        }
    }

    // Rebuild the error with a new description, keeping the variant.
    fn with_description(&self, description: String) -> Self {
        match self {
            Self::BackendUnavailable(_) => Self::BackendUnavailable(description),
            Self::NotFound(_) => Self::NotFound(description),
            Self::DuplicateId(_) => Self::DuplicateId(description),
            Self::InvalidTransition(_) => Self::InvalidTransition(description),
            Self::MalformedToken(_) => Self::MalformedToken(description),
            Self::VerificationFailed(_) => Self::VerificationFailed(description),
            Self::VerificationExpired(_) => Self::VerificationExpired(description),
            Self::PollTimeout(_) => Self::PollTimeout(description),
            Self::Cancelled(_) => Self::Cancelled(description),
            Self::Transport(_) => Self::Transport(description),
            Self::ServerError(_) => Self::ServerError(description),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<Self>() {
            Some(e) if err.chain().count() == 1 => e.clone(),
            Some(e) => e.with_description(format!("{err}: {}", e.description())),
            None => {
                let stack = err.chain().fold(String::new(), |cause, e| format!("{cause} -> {e}"));
                let stack = stack.trim_start_matches(" -> ").to_string();
                Self::ServerError(stack)
            }
        }
    }
}

impl HttpStatus for Error {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::DuplicateId(_) | Self::InvalidTransition(_) => StatusCode::CONFLICT,
            Self::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Construct an `Error::InvalidTransition` error from a format string.
macro_rules! invalid_transition {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::InvalidTransition(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::InvalidTransition(format!($err))
    };
}
pub(crate) use invalid_transition;

/// Construct an `Error::MalformedToken` error from a format string.
macro_rules! malformed {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::MalformedToken(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::MalformedToken(format!($err))
    };
}
pub(crate) use malformed;

#[cfg(test)]
mod test {
    use anyhow::{Context, Result, anyhow};
    use serde_json::{Value, json};

    use super::*;

    // Context added to a typed error is folded into its description.
    #[test]
    fn typed_context() {
        let result = Err::<(), Error>(Error::NotFound("session abc".to_string()))
            .context("checking session");
        let err: Error = result.unwrap_err().into();

        assert_eq!(
            err.to_string(),
            r#"{"error": "not_found", "error_description": "checking session: session abc"}"#
        );
    }

    // A typed error without context survives the round trip through anyhow.
    #[test]
    fn typed_passthrough() {
        let err: Error = anyhow::Error::new(Error::Cancelled("by caller".to_string())).into();
        assert_eq!(err, Error::Cancelled("by caller".to_string()));
    }

    #[test]
    fn anyhow_context() {
        let result = Err::<(), anyhow::Error>(anyhow!("one-off error")).context("error context");
        let err: Error = result.unwrap_err().into();

        assert_eq!(
            err.to_string(),
            r#"{"error": "server_error", "error_description": "error context -> one-off error"}"#
        );
    }

    #[test]
    fn serde_context() {
        let result: Result<Value, anyhow::Error> =
            serde_json::from_str(r#"{"foo": "bar""#).context("error context");
        let err: Error = result.unwrap_err().into();

        assert_eq!(
            err.to_string(),
            r#"{"error": "server_error", "error_description": "error context -> EOF while parsing an object at line 1 column 13"}"#
        );
    }

    #[test]
    fn json() {
        let err = Error::InvalidTransition("verified -> failed".to_string());
        let ser = serde_json::to_value(&err).unwrap();
        assert_eq!(
            ser,
            json!({"error":"invalid_transition", "error_description": "verified -> failed"})
        );

        let de: Error = serde_json::from_value(ser).unwrap();
        assert_eq!(de, err);
    }

    #[test]
    fn transient() {
        assert!(Error::Transport("connection reset".to_string()).is_transient());
        assert!(Error::BackendUnavailable("down".to_string()).is_transient());
        assert!(!Error::NotFound("gone".to_string()).is_transient());
        assert!(!Error::VerificationFailed("declined".to_string()).is_transient());
    }

    #[test]
    fn http_status() {
        assert_eq!(Error::NotFound(String::new()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::BackendUnavailable(String::new()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(Error::InvalidTransition(String::new()).status(), StatusCode::CONFLICT);
    }
}
