//! Runtime configuration, read from the command line with environment fallbacks.

use clap::Parser;
use std::time::Duration;

const DEFAULT_GOSSIP_INTERVAL_MS: u64 = 200;
const DEFAULT_GOSSIP_TIMEOUT_MS: u64 = 500;

#[derive(Debug, Clone, Parser)]
#[command(name = "gossip-broadcast", version, about = "Anti-entropy gossip broadcast node")]
pub struct Config {
    /// Delay between dissemination ticks.
    #[arg(
        long,
        env = "GOSSIP_INTERVAL_MS",
        default_value_t = DEFAULT_GOSSIP_INTERVAL_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub gossip_interval_ms: u64,

    /// How long a gossip round waits for `gossip_ok`.
    #[arg(
        long,
        env = "GOSSIP_TIMEOUT_MS",
        default_value_t = DEFAULT_GOSSIP_TIMEOUT_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub gossip_timeout_ms: u64,

    /// Default log filter, overridden by `RUST_LOG`.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Time between dissemination ticks.
    pub fn gossip_interval(&self) -> Duration {
        Duration::from_millis(self.gossip_interval_ms)
    }

    /// How long a gossip round waits for `gossip_ok`.
    pub fn gossip_timeout(&self) -> Duration {
        Duration::from_millis(self.gossip_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gossip_interval_ms: DEFAULT_GOSSIP_INTERVAL_MS,
            gossip_timeout_ms: DEFAULT_GOSSIP_TIMEOUT_MS,
            log_level: "info".to_string(),
        }
    }
}
