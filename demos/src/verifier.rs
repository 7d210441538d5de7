//! # Verification Service
//!
//! A (naive) HTTP server for starting and checking verification sessions.
//! The holder endpoints stand in for a wallet talking to the verification
//! backend.

use std::time::Duration;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::TypedHeader;
use axum_extra::headers::Host;
use chrono::Utc;
use credibil_verify::http::IntoHttp;
use credibil_verify::{
    CheckRequest, Client, Error, SessionSnapshot, StartRequest, StartResponse, VpToken, sweep,
};
use test_utils::Verifier;
use test_utils::token::diploma;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MIN_SWEEP: Duration = Duration::from_secs(1);

/// Serve the verifier API on `addr`, sweeping the session store every
/// `sweep_every`.
///
/// # Errors
///
/// Returns an error if the listener cannot bind to `addr`.
pub async fn serve(
    addr: &str, verifier: Verifier, sweep_every: Duration,
) -> Result<JoinHandle<()>> {
    let router = Router::new()
        .route("/verify/start", get(start_session))
        .route("/verify/check", post(check_session))
        .route("/holder/{id}/present", post(holder_present))
        .route("/holder/{id}/decline", post(holder_decline))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_methods(Any).allow_origin(Any).allow_headers(Any))
        .with_state(verifier.clone());

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on {addr}");

    tokio::spawn(sweeper(verifier, sweep_every));
    let jh = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("server stopped: {e}");
        }
    });

    Ok(jh)
}

async fn sweeper(verifier: Verifier, every: Duration) {
    // a zero period would panic the timer
    let mut interval = tokio::time::interval(every.max(MIN_SWEEP));
    loop {
        interval.tick().await;
        if let Err(e) = sweep(&verifier, Utc::now()).await {
            tracing::warn!("sweep failed: {e}");
        }
    }
}

#[axum::debug_handler]
async fn start_session(
    State(provider): State<Verifier>, TypedHeader(host): TypedHeader<Host>,
) -> impl IntoResponse {
    Client::new(format!("http://{host}"), provider)
        .handle::<_, StartResponse>(StartRequest)
        .await
        .into_http()
}

#[axum::debug_handler]
async fn check_session(
    State(provider): State<Verifier>, TypedHeader(host): TypedHeader<Host>,
    Json(request): Json<CheckRequest>,
) -> impl IntoResponse {
    Client::new(format!("http://{host}"), provider)
        .handle::<_, SessionSnapshot>(request)
        .await
        .into_http()
}

#[axum::debug_handler]
async fn holder_present(
    State(provider): State<Verifier>, Path(id): Path<String>,
) -> impl IntoResponse {
    let backend = provider.backend();
    let vp: VpToken = [diploma("did:example:ebfeb1f712ebc6f1c276e12ec21")].into_iter().collect();
    let result = backend.present(&id).and_then(|()| backend.verify(&id, vp));
    holder_response(&id, result)
}

#[axum::debug_handler]
async fn holder_decline(
    State(provider): State<Verifier>, Path(id): Path<String>,
) -> impl IntoResponse {
    holder_response(&id, provider.backend().fail(&id))
}

fn holder_response(id: &str, result: anyhow::Result<()>) -> axum::response::Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::debug!("holder update for {id} failed: {e}");
            (StatusCode::NOT_FOUND, Json(Error::NotFound(e.to_string()))).into_response()
        }
    }
}
