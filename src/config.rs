//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "A live-updating terminal client for a tiny social feed")]
pub struct Config {
    /// Base URL of the feed server
    #[arg(env = "LIVESCROLL_GATEWAY_URL", default_value = "http://localhost:8080")]
    pub gateway_url: String,

    /// Seconds between periodic refreshes
    #[arg(
        long,
        env = "LIVESCROLL_POLL_SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_secs: u64,

    /// Wait this long after the last keystroke before searching (0 = search on every keystroke)
    #[arg(long, env = "LIVESCROLL_DEBOUNCE_MS", default_value_t = 0)]
    pub debounce_ms: u64,

    /// Per-request timeout in seconds
    #[arg(long, env = "LIVESCROLL_TIMEOUT_SECS", default_value_t = 15)]
    pub timeout_secs: u64,

    /// Where to write the log (the terminal belongs to the UI)
    #[arg(long, env = "LIVESCROLL_LOG_FILE", default_value = "livescroll-feed.log")]
    pub log_file: PathBuf,
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_secs)
    }

    pub fn debounce(&self) -> Option<Duration> {
        (self.debounce_ms > 0).then(|| Duration::from_millis(self.debounce_ms))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
