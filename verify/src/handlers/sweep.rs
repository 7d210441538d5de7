//! # Sweep
//!
//! Evicts sessions that no longer need to be kept: resolved sessions once
//! their retention window has passed, and unresolved sessions that timed out
//! without anyone checking them.

use chrono::{DateTime, Utc};

use crate::handlers::Result;
use crate::provider::{Provider, SessionStore};
use crate::types::Eviction;

/// Evict sessions from the provider's store as of `now`, returning the
/// number evicted.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn sweep(provider: &impl Provider, now: DateTime<Utc>) -> Result<usize> {
    let lifetime = provider.lifetime();
    let eviction = Eviction {
        terminal_before: now - lifetime.retention(),
        stale_before: now - lifetime.timeout() - lifetime.retention(),
    };

    let evicted = SessionStore::evict(provider, eviction).await?;
    if evicted > 0 {
        tracing::debug!(evicted, "evicted sessions");
    }
    Ok(evicted)
}
