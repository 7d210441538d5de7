//! # Demo Configuration
//!
//! Settings shared by the demo binaries, read from command-line flags or the
//! environment.

use clap::Parser;
use credibil_verify::Lifetime;
use credibil_verify::link::WALLET_BASE;
use credibil_verify::poll::PollConfig;

/// Verifier service and polling settings.
#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Address the verifier service listens on.
    #[arg(long, env = "VERIFY_ADDR", default_value = "localhost:8080")]
    pub addr: String,

    /// Seconds before an unresolved session expires.
    #[arg(long, env = "VERIFY_TIMEOUT_SECS", default_value_t = 300)]
    pub timeout_secs: u32,

    /// Seconds a resolved session is kept before it is swept.
    #[arg(long, env = "VERIFY_RETENTION_SECS", default_value_t = 600)]
    pub retention_secs: u32,

    /// Seconds between sweeps of the session store.
    #[arg(
        long,
        env = "VERIFY_SWEEP_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub sweep_secs: u64,

    /// Milliseconds between checks while polling.
    #[arg(long, env = "VERIFY_INTERVAL_MS", default_value_t = 1000)]
    pub interval_ms: u64,

    /// Give up polling after this many checks.
    #[arg(long, env = "VERIFY_MAX_ATTEMPTS")]
    pub max_attempts: Option<u32>,

    /// Wallet deep-link base used to open holder links in a browser.
    #[arg(long, env = "VERIFY_WALLET_BASE", default_value = WALLET_BASE)]
    pub wallet_base: String,

    /// Log filter, e.g. `info` or `credibil_verify=debug`.
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log: String,
}

impl Config {
    /// Session timeout and retention.
    #[must_use]
    pub const fn lifetime(&self) -> Lifetime {
        Lifetime {
            timeout_secs: self.timeout_secs,
            retention_secs: self.retention_secs,
        }
    }

    /// Poller settings.
    #[must_use]
    pub fn poll(&self) -> PollConfig {
        PollConfig {
            interval_ms: self.interval_ms,
            max_attempts: self.max_attempts,
            ..PollConfig::default()
        }
    }

    /// The base URL of the verifier service.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Install a `tracing` subscriber that logs to stdout using `filter`.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been set.
pub fn init_tracing(filter: &str) -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
