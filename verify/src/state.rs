//! Lifetime settings for sessions held in the session store.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Default durations for session state.
pub enum Expire {
    /// An unresolved session expires this long after it is created.
    Session,

    /// A resolved session is retained this long before eviction.
    Retention,
}

impl Expire {
    /// Returns the duration for which the state item is valid.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        match self {
            Self::Session => TimeDelta::try_minutes(5).unwrap_or_default(),
            Self::Retention => TimeDelta::try_minutes(10).unwrap_or_default(),
        }
    }
}

/// Session timeout and retention, in seconds.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Lifetime {
    /// Seconds after creation before an unresolved session expires.
    pub timeout_secs: u32,

    /// Seconds a resolved session is kept before it may be evicted.
    pub retention_secs: u32,
}

impl Default for Lifetime {
    fn default() -> Self {
        Self {
            timeout_secs: secs(&Expire::Session),
            retention_secs: secs(&Expire::Retention),
        }
    }
}

impl Lifetime {
    /// Time allowed for a session to resolve.
    #[must_use]
    pub fn timeout(&self) -> TimeDelta {
        TimeDelta::seconds(i64::from(self.timeout_secs))
    }

    /// Time a resolved session is retained.
    #[must_use]
    pub fn retention(&self) -> TimeDelta {
        TimeDelta::seconds(i64::from(self.retention_secs))
    }
}

fn secs(expire: &Expire) -> u32 {
    u32::try_from(expire.duration().num_seconds()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let lifetime = Lifetime::default();
        assert_eq!(lifetime.timeout(), TimeDelta::minutes(5));
        assert_eq!(lifetime.retention(), TimeDelta::minutes(10));
    }

    #[test]
    fn partial_config() {
        let lifetime: Lifetime = serde_json::from_str(r#"{"timeoutSecs": 30}"#).unwrap();
        assert_eq!(lifetime.timeout_secs, 30);
        assert_eq!(lifetime.retention_secs, 600);
    }
}
