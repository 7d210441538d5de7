//! # Generate
//!
//! Generate identifiers for sessions.

use uuid::Uuid;

/// Generates a new session identifier.
#[must_use]
pub fn session_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn unique_ids() {
        let ids: HashSet<String> = (0..1000).map(|_| session_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
