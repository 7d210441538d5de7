//! # Mock Verification Backend
//!
//! Stands in for the external service that receives presentations from
//! wallets and verifies them. Tests (and the demo service) play the holder by
//! calling [`MockBackend::present`], [`MockBackend::verify`], and friends.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, anyhow};
use base64ct::{Base64UrlUnpadded, Encoding};
use credibil_verify::provider::Backend;
use credibil_verify::{SessionSnapshot, Status, VpToken};
use dashmap::DashMap;

/// In-memory backend keyed by session id.
#[derive(Clone, Debug, Default)]
pub struct MockBackend {
    requests: Arc<DashMap<String, SessionSnapshot>>,
    offline: Arc<AtomicBool>,
}

impl MockBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every call fails while `offline` is set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// The holder has submitted a credential.
    pub fn present(&self, id: &str) -> Result<()> {
        self.set(id, SessionSnapshot::new(Status::Presented))
    }

    /// The submitted credential verified.
    pub fn verify(&self, id: &str, presentation: VpToken) -> Result<()> {
        self.set(id, SessionSnapshot::verified(presentation))
    }

    /// The holder declined, or the credential did not verify.
    pub fn fail(&self, id: &str) -> Result<()> {
        self.set(id, SessionSnapshot::new(Status::Failed))
    }

    /// Overwrite the backend's view of a request.
    pub fn set(&self, id: &str, snapshot: SessionSnapshot) -> Result<()> {
        let Some(mut request) = self.requests.get_mut(id) else {
            return Err(anyhow!("no presentation request for {id}"));
        };
        *request = snapshot;
        Ok(())
    }

    fn online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(anyhow!("backend offline"));
        }
        Ok(())
    }
}

impl Backend for MockBackend {
    async fn allocate(&self, verifier: &str, id: &str) -> Result<String> {
        self.online()?;
        self.requests.insert(id.to_string(), SessionSnapshot::new(Status::Initiated));
        let nonce = nonce();
        Ok(format!("openid-vc://?request_uri={verifier}/request/{id}&nonce={nonce}"))
    }

    async fn status(&self, _verifier: &str, id: &str) -> Result<SessionSnapshot> {
        self.online()?;
        let Some(request) = self.requests.get(id) else {
            return Err(anyhow!("no presentation request for {id}"));
        };
        Ok(request.clone())
    }
}

const NONCE_LEN: usize = 32;

// A url-safe random nonce for presentation request links. Uses fastrand so is
// not cryptographically secure.
fn nonce() -> String {
    let bytes: Vec<u8> = (0..NONCE_LEN).map(|_| fastrand::u8(..)).collect();
    Base64UrlUnpadded::encode_string(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_is_url_safe() {
        let nonce = nonce();
        assert_eq!(nonce.len(), 43);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
