//! # Polling Client
//!
//! Drives repeated `check` calls against a session until it resolves.
//!
//! The loop suspends only between checks, for a fixed interval. Callers get
//! progress through an `on_status` callback and can cancel at any
//! suspension point with a [`CancelToken`]. [`Poller::spawn`] runs the loop
//! as a task and returns a [`PollHandle`] that cancels the poll when it is
//! dropped.
//!
//! Transient failures of a single check (transport errors, unreadable
//! responses, an unavailable backend) are logged and retried on the same
//! interval, up to [`PollConfig::max_transient_errors`] in a row. Every other
//! error ends the poll.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::instrument;

use crate::handlers::{Client, Result};
use crate::provider::Provider;
use crate::types::{CheckRequest, SessionSnapshot, Status};
use crate::{Error, handle};

/// Polling settings.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PollConfig {
    /// Milliseconds to wait between checks.
    pub interval_ms: u64,

    /// Give up with `PollTimeout` after this many checks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    /// Consecutive transient check failures to tolerate before giving up.
    pub max_transient_errors: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_attempts: None,
            max_transient_errors: 3,
        }
    }
}

impl PollConfig {
    /// The delay between checks.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// The `check` operation a poller drives.
///
/// Implemented by the in-process [`Client`] and by remote clients that call
/// a verifier service over the network.
pub trait Checker: Send + Sync {
    /// Fetch the current state of session `id`.
    fn check(&self, id: &str) -> impl Future<Output = Result<SessionSnapshot>> + Send;
}

impl<P: Provider> Checker for Client<P> {
    async fn check(&self, id: &str) -> Result<SessionSnapshot> {
        let response = handle(self.verifier(), CheckRequest::new(id), self.provider()).await?;
        Ok(response.body)
    }
}

/// Suspends the polling loop between checks.
pub trait Delay: Send + Sync {
    /// Wait for `duration`.
    fn delay(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Suspends using the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioDelay;

impl Delay for TokioDelay {
    async fn delay(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Cancels a poll. Clones share the same state and cancelling more than once
/// has no further effect.
#[derive(Clone, Debug)]
pub struct CancelToken {
    state: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    /// Create a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self { state: Arc::new(state) }
    }

    /// Cancel the poll.
    pub fn cancel(&self) {
        self.state.send_replace(true);
    }

    /// Returns `true` once the token has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Completes when the token is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.state.subscribe();
        // the sender lives as long as `self`, so waiting cannot fail
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Polls a session until it resolves.
#[derive(Clone, Debug)]
pub struct Poller<C, D = TokioDelay> {
    checker: C,
    delay: D,
    config: PollConfig,
}

impl<C: Checker> Poller<C> {
    /// Create a poller with the default configuration and the tokio timer.
    #[must_use]
    pub fn new(checker: C) -> Self {
        Self {
            checker,
            delay: TokioDelay,
            config: PollConfig::default(),
        }
    }
}

impl<C: Checker, D: Delay> Poller<C, D> {
    /// Replace the polling configuration.
    #[must_use]
    pub fn with_config(mut self, config: PollConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the suspend primitive used between checks.
    #[must_use]
    pub fn with_delay<E: Delay>(self, delay: E) -> Poller<C, E> {
        Poller {
            checker: self.checker,
            delay,
            config: self.config,
        }
    }

    /// The polling configuration.
    #[must_use]
    pub const fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Check session `id` until it resolves.
    ///
    /// `on_status` is called with every unresolved status before the poller
    /// suspends.
    ///
    /// # Errors
    ///
    /// Returns `VerificationFailed` or `VerificationExpired` when the session
    /// resolves unsuccessfully, `PollTimeout` when `max_attempts` is used up,
    /// and `Cancelled` when `cancel` fires. Errors from `check` that are not
    /// transient, or that exceed `max_transient_errors`, are returned as-is.
    #[instrument(level = "debug", skip(self, cancel, on_status))]
    pub async fn poll_until_resolved<F>(
        &self, id: &str, cancel: &CancelToken, mut on_status: F,
    ) -> Result<SessionSnapshot>
    where
        F: FnMut(Status) + Send,
    {
        let mut attempts = 0u32;
        let mut transient = 0u32;

        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled(format!("polling session {id}")));
            }
            attempts += 1;

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Error::Cancelled(format!("polling session {id}"))),
                result = self.checker.check(id) => result,
            };

            match result {
                Ok(snapshot) => {
                    transient = 0;
                    match snapshot.status {
                        Status::Verified => return Ok(snapshot),
                        Status::Failed => {
                            return Err(Error::VerificationFailed(format!("session {id} failed")));
                        }
                        Status::Expired => {
                            return Err(Error::VerificationExpired(format!("session {id} expired")));
                        }
                        status => on_status(status),
                    }
                }
                Err(e) if e.is_transient() && transient < self.config.max_transient_errors => {
                    transient += 1;
                    tracing::warn!(attempt = attempts, "transient error checking session {id}: {e}");
                }
                Err(e) => return Err(e),
            }

            if self.config.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(Error::PollTimeout(format!(
                    "session {id} unresolved after {attempts} attempts"
                )));
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Error::Cancelled(format!("polling session {id}"))),
                () = self.delay.delay(self.config.interval()) => {}
            }
        }
    }
}

impl<C, D> Poller<C, D>
where
    C: Checker + 'static,
    D: Delay + 'static,
{
    /// Poll session `id` on a new task.
    ///
    /// The returned handle owns the poll's cancellation token: cancelling it,
    /// or dropping it, stops the poll at its next suspension point.
    pub fn spawn<F>(self, id: impl Into<String>, on_status: F) -> PollHandle
    where
        F: FnMut(Status) + Send + 'static,
    {
        let id = id.into();
        let cancel = CancelToken::new();
        let token = cancel.clone();

        let task =
            tokio::spawn(async move { self.poll_until_resolved(&id, &token, on_status).await });

        PollHandle {
            cancel,
            task: Some(task),
        }
    }
}

/// Handle to a spawned poll.
#[derive(Debug)]
pub struct PollHandle {
    cancel: CancelToken,
    task: Option<JoinHandle<Result<SessionSnapshot>>>,
}

impl PollHandle {
    /// Cancel the poll. Cancelling more than once is a no-op.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this poll.
    #[must_use]
    pub fn token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Wait for the poll to finish.
    ///
    /// # Errors
    ///
    /// Returns the poll's error, or `Cancelled` if the task was aborted.
    pub async fn join(mut self) -> Result<SessionSnapshot> {
        let Some(task) = self.task.take() else {
            return Err(Error::Cancelled("poll already joined".to_string()));
        };
        match task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(Error::Cancelled("poll task aborted".to_string())),
            Err(e) => Err(Error::ServerError(format!("poll task failed: {e}"))),
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PollConfig::default();
        assert_eq!(config.interval(), Duration::from_secs(1));
        assert_eq!(config.max_attempts, None);
    }

    #[test]
    fn config_from_json() {
        let config: PollConfig =
            serde_json::from_str(r#"{"intervalMs": 250, "maxAttempts": 10}"#).unwrap();
        assert_eq!(config.interval(), Duration::from_millis(250));
        assert_eq!(config.max_attempts, Some(10));
        assert_eq!(config.max_transient_errors, 3);
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());

        // resolves immediately once cancelled
        token.cancelled().await;
    }

    #[tokio::test]
    async fn clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();

        let waiter = tokio::spawn(async move { clone.cancelled().await });
        token.cancel();
        waiter.await.expect("waiter should finish");
    }
}
