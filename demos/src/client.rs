//! # Remote Verifier Client
//!
//! Calls the demo verifier service over HTTP. [`HttpChecker`] implements
//! [`Checker`] so a [`credibil_verify::poll::Poller`] can drive a remote
//! session.

use credibil_verify::poll::Checker;
use credibil_verify::{CheckRequest, Error, SessionSnapshot, StartResponse};
use serde::de::DeserializeOwned;

/// HTTP client for the verifier service at `base_url`.
#[derive(Clone, Debug)]
pub struct HttpChecker {
    http: reqwest::Client,
    base_url: String,
}

impl HttpChecker {
    /// Create a client for the service at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Start a new verification session.
    ///
    /// # Errors
    ///
    /// Returns the service's error, or `Error::Transport` if the service
    /// cannot be reached.
    pub async fn start(&self) -> Result<StartResponse, Error> {
        let url = format!("{}/verify/start", self.base_url);
        let http_resp = self.http.get(url).send().await.map_err(transport)?;
        read(http_resp).await
    }

    /// Simulate the holder presenting a credential for session `id`.
    ///
    /// # Errors
    ///
    /// Returns the service's error, or `Error::Transport` if the service
    /// cannot be reached.
    pub async fn present(&self, id: &str) -> Result<(), Error> {
        self.holder(id, "present").await
    }

    /// Simulate the holder declining session `id`.
    ///
    /// # Errors
    ///
    /// Returns the service's error, or `Error::Transport` if the service
    /// cannot be reached.
    pub async fn decline(&self, id: &str) -> Result<(), Error> {
        self.holder(id, "decline").await
    }

    async fn holder(&self, id: &str, action: &str) -> Result<(), Error> {
        let url = format!("{}/holder/{id}/{action}", self.base_url);
        let http_resp = self.http.post(url).send().await.map_err(transport)?;
        if http_resp.status().is_success() {
            return Ok(());
        }
        Err(service_error(http_resp).await)
    }
}

impl Checker for HttpChecker {
    async fn check(&self, id: &str) -> Result<SessionSnapshot, Error> {
        let url = format!("{}/verify/check", self.base_url);
        let http_resp =
            self.http.post(url).json(&CheckRequest::new(id)).send().await.map_err(transport)?;
        read(http_resp).await
    }
}

async fn read<T: DeserializeOwned>(http_resp: reqwest::Response) -> Result<T, Error> {
    if !http_resp.status().is_success() {
        return Err(service_error(http_resp).await);
    }
    http_resp
        .json::<T>()
        .await
        .map_err(|e| Error::Transport(format!("issue deserializing response: {e}")))
}

// The service returns errors as `{"error", "error_description"}`. Anything
// else is a transport problem.
async fn service_error(http_resp: reqwest::Response) -> Error {
    let status = http_resp.status();
    match http_resp.json::<Error>().await {
        Ok(error) => error,
        Err(e) => Error::Transport(format!("unexpected {status} response: {e}")),
    }
}

fn transport(e: reqwest::Error) -> Error {
    Error::Transport(format!("issue calling verifier: {e}"))
}
