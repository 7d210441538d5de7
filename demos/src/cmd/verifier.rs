//! Verifier
//!
//! Runs the example verification service until `ctrl-c`.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use demos::config::{Config, init_tracing};
use demos::verifier;
use test_utils::Verifier;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    init_tracing(&config.log)?;

    let provider = Verifier::new().with_lifetime(config.lifetime());
    verifier::serve(&config.addr, provider, Duration::from_secs(config.sweep_secs)).await?;

    // block until `ctrl-c`
    Ok(tokio::signal::ctrl_c().await?)
}
