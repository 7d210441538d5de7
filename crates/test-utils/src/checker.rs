//! # Poller Test Doubles

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use credibil_verify::poll::{Checker, Delay};
use credibil_verify::{Error, SessionSnapshot, Status};

/// Replays a fixed sequence of `check` results, then keeps reporting
/// `initiated`.
#[derive(Clone, Debug, Default)]
pub struct ScriptedChecker {
    script: Arc<Mutex<VecDeque<Result<SessionSnapshot, Error>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedChecker {
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = Result<SessionSnapshot, Error>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            calls: Arc::default(),
        }
    }

    /// Script a sequence of statuses.
    #[must_use]
    pub fn statuses(statuses: impl IntoIterator<Item = Status>) -> Self {
        Self::new(statuses.into_iter().map(|s| Ok(SessionSnapshot::new(s))))
    }

    /// Number of `check` calls made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Checker for ScriptedChecker {
    async fn check(&self, _id: &str) -> Result<SessionSnapshot, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().ok().and_then(|mut script| script.pop_front());
        next.unwrap_or_else(|| Ok(SessionSnapshot::new(Status::Initiated)))
    }
}

/// Records each suspension and returns immediately.
#[derive(Clone, Debug, Default)]
pub struct CountingDelay {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl CountingDelay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The durations requested so far.
    #[must_use]
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

impl Delay for CountingDelay {
    async fn delay(&self, duration: Duration) {
        if let Ok(mut delays) = self.delays.lock() {
            delays.push(duration);
        }
        tokio::task::yield_now().await;
    }
}

/// Never wakes up. Only cancellation ends a poll using this delay.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stall;

impl Delay for Stall {
    async fn delay(&self, _duration: Duration) {
        std::future::pending::<()>().await;
    }
}

/// A checker whose `check` never completes. Counts calls.
#[derive(Clone, Debug, Default)]
pub struct Unanswered {
    calls: Arc<AtomicUsize>,
}

impl Unanswered {
    /// Number of `check` calls started so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Checker for Unanswered {
    async fn check(&self, _id: &str) -> Result<SessionSnapshot, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}
