//! # Start and Check Endpoint Types

use serde::{Deserialize, Serialize};

/// Request to start a new verification session. Takes no parameters.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct StartRequest;

/// Returned by `start` once a session has been created.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct StartResponse {
    /// The holder-facing link. Usually rendered as a QR code for the holder
    /// to scan with their wallet.
    #[serde(rename = "url", alias = "sessionLink")]
    pub session_link: String,

    /// Identifies the session in subsequent `check` requests.
    #[serde(rename = "request_id", alias = "id")]
    pub id: String,
}

/// Request the current state of a session.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CheckRequest {
    /// The session identifier returned by `start`.
    #[serde(rename = "request_id", alias = "id")]
    pub id: String,
}

impl CheckRequest {
    /// Create a check request for the session `id`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}
