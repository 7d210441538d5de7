//! # Session
//!
//! A session tracks a single verification attempt from the moment a client
//! asks for a presentation until the holder's credential is verified, the
//! attempt fails, or it times out.

use std::fmt::{self, Display};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, invalid_transition};

/// Session lifecycle status.
///
/// `Initiated` is the only start state. `Verified`, `Failed`, and `Expired`
/// are terminal: a session in one of these states never changes again.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The session has been created and is waiting for the holder.
    #[default]
    Initiated,

    /// The holder has submitted a credential that is awaiting verification.
    Presented,

    /// The presented credential was verified.
    Verified,

    /// The holder declined, or the credential was malformed or did not
    /// verify.
    Failed,

    /// The session timed out before it was resolved.
    Expired,
}

impl Status {
    /// Returns `true` if no further transitions are permitted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Verified | Self::Failed | Self::Expired)
    }

    /// Returns `true` if `next` is a direct successor of this status.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Initiated, Self::Presented | Self::Failed | Self::Expired)
                | (Self::Presented, Self::Verified | Self::Failed | Self::Expired)
        )
    }

    /// The sequence of statuses needed to move from this status to `target`.
    ///
    /// A `verified` result implies the credential was presented, so a jump
    /// from `initiated` to `verified` passes through `presented`. Every other
    /// target is a single step, valid or not.
    #[must_use]
    pub fn path_to(self, target: Self) -> Vec<Self> {
        if self == Self::Initiated && target == Self::Verified {
            vec![Self::Presented, Self::Verified]
        } else {
            vec![target]
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Initiated => "initiated",
            Self::Presented => "presented",
            Self::Verified => "verified",
            Self::Failed => "failed",
            Self::Expired => "expired",
        };
        write!(f, "{s}")
    }
}

/// The raw credential tokens presented by the holder.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct VpToken {
    /// Compact signed credential tokens, in the order they were received.
    #[serde(rename = "verifiableCredential")]
    pub verifiable_credential: Vec<String>,
}

impl<S: Into<String>> FromIterator<S> for VpToken {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            verifiable_credential: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// A verification session record, owned by the session store.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Session {
    /// Unique session identifier. Immutable.
    pub id: String,

    /// Current lifecycle status.
    pub status: Status,

    /// The link the holder follows to submit a credential. Immutable.
    pub holder_link: String,

    /// The presented credentials. Only set when `status` is `verified`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presentation: Option<VpToken>,

    /// When the session was created.
    pub created_at: DateTime<Utc>,

    /// When the session last changed status.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session in the `initiated` state.
    #[must_use]
    pub fn new(id: impl Into<String>, holder_link: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            status: Status::Initiated,
            holder_link: holder_link.into(),
            presentation: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a transition, enforcing the session lifecycle.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` when the transition is not an edge
    /// of the lifecycle, or when a presentation is attached to any status
    /// other than `verified` (or missing from `verified`). The session is
    /// left unchanged on error.
    pub fn apply(&mut self, transition: Transition) -> Result<(), Error> {
        if !self.status.can_transition_to(transition.status) {
            return Err(invalid_transition!(
                "session {}: {} -> {}",
                self.id,
                self.status,
                transition.status
            ));
        }
        match (transition.status, &transition.presentation) {
            (Status::Verified, None) => {
                return Err(invalid_transition!("session {}: verified without presentation", self.id));
            }
            (status, Some(_)) if status != Status::Verified => {
                return Err(invalid_transition!("session {}: presentation on {}", self.id, status));
            }
            _ => {}
        }

        self.status = transition.status;
        self.presentation = transition.presentation;
        self.updated_at = transition.at;
        Ok(())
    }

    /// Returns `true` if the session is unresolved and `timeout` has elapsed
    /// since it was created.
    #[must_use]
    pub fn is_timed_out(&self, now: DateTime<Utc>, timeout: TimeDelta) -> bool {
        !self.status.is_terminal() && now >= self.created_at + timeout
    }

    /// Returns `true` if the session may be evicted under `eviction`.
    #[must_use]
    pub fn is_evictable(&self, eviction: &Eviction) -> bool {
        if self.status.is_terminal() {
            self.updated_at < eviction.terminal_before
        } else {
            self.created_at < eviction.stale_before
        }
    }

    /// The externally visible state of the session.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            presentation: self.presentation.clone(),
        }
    }
}

/// A status change to apply to a stored session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    /// The target status.
    pub status: Status,

    /// The presentation to record. Required for, and only allowed with,
    /// `verified`.
    pub presentation: Option<VpToken>,

    /// When the transition took place.
    pub at: DateTime<Utc>,
}

impl Transition {
    /// A transition to `status` without a presentation, taking place now.
    #[must_use]
    pub fn to(status: Status) -> Self {
        Self {
            status,
            presentation: None,
            at: Utc::now(),
        }
    }

    /// A transition to `verified` with the presented credentials.
    #[must_use]
    pub fn verified(presentation: VpToken) -> Self {
        Self {
            status: Status::Verified,
            presentation: Some(presentation),
            at: Utc::now(),
        }
    }

    /// Set the time the transition took place.
    #[must_use]
    pub const fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = at;
        self
    }
}

/// Cut-off times used when evicting sessions from the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Eviction {
    /// Terminal sessions last updated before this time are evicted.
    pub terminal_before: DateTime<Utc>,

    /// Unresolved sessions created before this time are evicted.
    pub stale_before: DateTime<Utc>,
}

/// The current state of a session as reported to callers of `check`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The session status.
    pub status: Status,

    /// The presented credentials, when `status` is `verified`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presentation: Option<VpToken>,
}

impl SessionSnapshot {
    /// A snapshot with the given status and no presentation.
    #[must_use]
    pub const fn new(status: Status) -> Self {
        Self {
            status,
            presentation: None,
        }
    }

    /// A `verified` snapshot carrying the presented credentials.
    #[must_use]
    pub const fn verified(presentation: VpToken) -> Self {
        Self {
            status: Status::Verified,
            presentation: Some(presentation),
        }
    }
}
