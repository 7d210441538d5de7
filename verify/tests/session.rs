//! Tests for starting and checking verification sessions.

use chrono::{TimeDelta, Utc};
use credibil_verify::provider::{Lifetime, SessionStore};
use credibil_verify::{Client, Error, SessionSnapshot, Status, VpToken, sweep};
use test_utils::token::diploma;
use test_utils::{VERIFIER_ID, Verifier};

fn client(provider: &Verifier) -> Client<Verifier> {
    Client::new(VERIFIER_ID, provider.clone())
}

// Should create an `initiated` session with a holder link.
#[tokio::test]
async fn start_session() {
    let provider = Verifier::new();
    let client = client(&provider);

    let started = client.start().await.expect("should start");
    assert!(started.session_link.starts_with("openid-vc://?request_uri=http://localhost:8080/request/"));
    assert!(started.session_link.contains(&started.id));

    let session = SessionStore::get(&provider, &started.id).await.expect("should be stored");
    assert_eq!(session.status, Status::Initiated);
    assert_eq!(session.holder_link, started.session_link);
    assert!(session.presentation.is_none());
}

// Each start creates a distinct session.
#[tokio::test]
async fn unique_sessions() {
    let client = client(&Verifier::new());

    let first = client.start().await.expect("should start");
    let second = client.start().await.expect("should start");
    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn backend_unavailable() {
    let provider = Verifier::new();
    provider.backend().set_offline(true);

    let err = client(&provider).start().await.expect_err("backend is offline");
    assert!(matches!(err, Error::BackendUnavailable(_)));
    assert!(provider.store().is_empty(), "no session without a backend request");
}

// The happy path: initiated -> presented -> verified.
#[tokio::test]
async fn presented_then_verified() {
    let provider = Verifier::new();
    let client = client(&provider);
    let id = client.start().await.expect("should start").id;

    assert_eq!(client.check(&id).await.expect("check").status, Status::Initiated);

    provider.backend().present(&id).expect("should present");
    assert_eq!(client.check(&id).await.expect("check").status, Status::Presented);

    let vp: VpToken = [diploma("did:example:alice")].into_iter().collect();
    provider.backend().verify(&id, vp.clone()).expect("should verify");

    let snapshot = client.check(&id).await.expect("check");
    assert_eq!(snapshot, SessionSnapshot::verified(vp));
}

// A session the backend verified between two checks passes through
// `presented` on its way to `verified`.
#[tokio::test]
async fn verified_between_checks() {
    let provider = Verifier::new();
    let client = client(&provider);
    let id = client.start().await.expect("should start").id;

    let vp: VpToken = [diploma("did:example:bob")].into_iter().collect();
    provider.backend().verify(&id, vp).expect("should verify");

    let snapshot = client.check(&id).await.expect("check");
    assert_eq!(snapshot.status, Status::Verified);
    assert!(snapshot.presentation.is_some());
}

#[tokio::test]
async fn holder_declines() {
    let provider = Verifier::new();
    let client = client(&provider);
    let id = client.start().await.expect("should start").id;

    provider.backend().fail(&id).expect("should fail");
    assert_eq!(client.check(&id).await.expect("check").status, Status::Failed);

    // terminal: later backend reports are ignored
    let vp: VpToken = [diploma("did:example:carol")].into_iter().collect();
    provider.backend().verify(&id, vp).expect("backend accepts");
    assert_eq!(client.check(&id).await.expect("check").status, Status::Failed);
}

// A backend that reports a session moving backwards is an error, not a
// silent no-op.
#[tokio::test]
async fn backward_report() {
    let provider = Verifier::new();
    let client = client(&provider);
    let id = client.start().await.expect("should start").id;

    provider.backend().present(&id).expect("should present");
    client.check(&id).await.expect("check");

    provider.backend().set(&id, SessionSnapshot::new(Status::Initiated)).expect("should set");
    let err = client.check(&id).await.expect_err("should reject");
    assert!(matches!(err, Error::InvalidTransition(_)));
}

// A verified report without credentials is inconsistent.
#[tokio::test]
async fn verified_without_presentation() {
    let provider = Verifier::new();
    let client = client(&provider);
    let id = client.start().await.expect("should start").id;

    provider.backend().present(&id).expect("should present");
    client.check(&id).await.expect("check");
    provider.backend().set(&id, SessionSnapshot::new(Status::Verified)).expect("should set");

    let err = client.check(&id).await.expect_err("should reject");
    assert!(matches!(err, Error::InvalidTransition(_)));
    assert_eq!(SessionStore::get(&provider, &id).await.expect("get").status, Status::Presented);
}

// A rejected report that would take two steps leaves the session where it
// was, not half way along.
#[tokio::test]
async fn verified_without_presentation_from_initiated() {
    let provider = Verifier::new();
    let client = client(&provider);
    let id = client.start().await.expect("should start").id;

    provider.backend().set(&id, SessionSnapshot::new(Status::Verified)).expect("should set");

    let err = client.check(&id).await.expect_err("should reject");
    assert!(matches!(err, Error::InvalidTransition(_)));

    let session = SessionStore::get(&provider, &id).await.expect("get");
    assert_eq!(session.status, Status::Initiated);
    assert_eq!(session.updated_at, session.created_at);
}

#[tokio::test]
async fn unknown_session() {
    let err = client(&Verifier::new()).check("no-such-session").await.expect_err("unknown");
    assert!(matches!(err, Error::NotFound(_)));
}

// Unresolved sessions expire once the timeout has passed.
#[tokio::test]
async fn timed_out() {
    let lifetime = Lifetime {
        timeout_secs: 0,
        retention_secs: 60,
    };
    let provider = Verifier::new().with_lifetime(lifetime);
    let client = client(&provider);
    let id = client.start().await.expect("should start").id;

    assert_eq!(client.check(&id).await.expect("check").status, Status::Expired);
}

#[tokio::test]
async fn check_while_backend_down() {
    let provider = Verifier::new();
    let client = client(&provider);
    let id = client.start().await.expect("should start").id;

    provider.backend().set_offline(true);
    let err = client.check(&id).await.expect_err("backend is offline");
    assert!(err.is_transient());

    provider.backend().set_offline(false);
    assert_eq!(client.check(&id).await.expect("check").status, Status::Initiated);
}

// Resolved sessions are evicted after the retention window; checking them
// afterwards is `NotFound`, never a stale snapshot.
#[tokio::test]
async fn sweep_resolved() {
    let provider = Verifier::new();
    let client = client(&provider);

    let done = client.start().await.expect("should start").id;
    provider.backend().fail(&done).expect("should fail");
    client.check(&done).await.expect("check");

    let pending = client.start().await.expect("should start").id;

    assert_eq!(sweep(&provider, Utc::now()).await.expect("sweep"), 0);

    let later = Utc::now() + provider_retention() + TimeDelta::seconds(1);
    assert_eq!(sweep(&provider, later).await.expect("sweep"), 1);

    let err = client.check(&done).await.expect_err("evicted");
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(client.check(&pending).await.expect("check").status, Status::Initiated);
}

// Unresolved sessions nobody checks are evicted after timeout + retention.
#[tokio::test]
async fn sweep_abandoned() {
    let provider = Verifier::new();
    let client = client(&provider);
    let id = client.start().await.expect("should start").id;

    let lifetime = Lifetime::default();
    let later = Utc::now() + lifetime.timeout() + lifetime.retention() + TimeDelta::seconds(1);
    assert_eq!(sweep(&provider, later).await.expect("sweep"), 1);

    let err = client.check(&id).await.expect_err("evicted");
    assert!(matches!(err, Error::NotFound(_)));
}

fn provider_retention() -> TimeDelta {
    Lifetime::default().retention()
}
