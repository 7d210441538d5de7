//! Automated
//!
//! Starts the example verifier, opens a session, plays the holder, and polls
//! the session over HTTP until it resolves.

use std::time::Duration;

use anyhow::{Result, anyhow};
use clap::Parser;
use credibil_verify::link::wallet_url;
use credibil_verify::poll::Poller;
use credibil_verify::token::DecodeMode;
use demos::client::HttpChecker;
use demos::config::{Config, init_tracing};
use demos::verifier;
use test_utils::Verifier;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    init_tracing(&config.log)?;

    let provider = Verifier::new().with_lifetime(config.lifetime());
    verifier::serve(&config.addr, provider, Duration::from_secs(config.sweep_secs)).await?;

    let checker = HttpChecker::new(config.base_url());
    let started = checker.start().await?;
    println!("open in a wallet: {}", wallet_url(&started.session_link, &config.wallet_base));

    // the holder responds after a couple of polls
    let holder = checker.clone();
    let id = started.id.clone();
    let delay = config.poll().interval() * 2;
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Err(e) = holder.present(&id).await {
            tracing::warn!("holder could not present: {e}");
        }
    });

    let handle = Poller::new(checker)
        .with_config(config.poll())
        .spawn(started.id, |status| tracing::info!("session is {status}"));
    let token = handle.token();

    let snapshot = tokio::select! {
        result = handle.join() => result?,
        _ = tokio::signal::ctrl_c() => {
            token.cancel();
            return Err(anyhow!("cancelled"));
        }
    };

    let Some(vp) = snapshot.presentation else {
        return Err(anyhow!("verified session has no presentation"));
    };
    let presentation = vp.decode(DecodeMode::Lenient)?;
    for malformed in &presentation.malformed {
        tracing::warn!(index = malformed.index, "skipped malformed credential: {}", malformed.reason);
    }
    for claims in &presentation.verifiable_credential {
        println!("{}", serde_json::to_string_pretty(claims)?);
    }

    Ok(())
}
