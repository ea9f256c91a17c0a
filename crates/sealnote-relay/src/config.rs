//! Relay configuration, read from the environment.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

use sealnote_core::relay::{DEFAULT_MAX_SESSIONS, DEFAULT_SWEEP_INTERVAL};

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Upper bound on live sessions before `POST /api/session` answers 503.
    pub max_sessions: usize,
    pub sweep_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_sessions: DEFAULT_MAX_SESSIONS,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl Config {
    /// Load from `BIND_ADDRESS`, `SEALNOTE_MAX_SESSIONS` and
    /// `SEALNOTE_SWEEP_INTERVAL_SECS`, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_address = lookup("BIND_ADDRESS")
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string())
            .parse()
            .context("BIND_ADDRESS must be a socket address such as 127.0.0.1:3000")?;

        let max_sessions = match lookup("SEALNOTE_MAX_SESSIONS") {
            Some(raw) => raw
                .parse::<usize>()
                .context("SEALNOTE_MAX_SESSIONS must be a positive integer")?,
            None => DEFAULT_MAX_SESSIONS,
        };
        if max_sessions == 0 {
            anyhow::bail!("SEALNOTE_MAX_SESSIONS must be greater than zero");
        }

        let sweep_interval = match lookup("SEALNOTE_SWEEP_INTERVAL_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse::<u64>()
                    .context("SEALNOTE_SWEEP_INTERVAL_SECS must be a positive integer")?,
            ),
            None => DEFAULT_SWEEP_INTERVAL,
        };
        if sweep_interval.is_zero() {
            anyhow::bail!("SEALNOTE_SWEEP_INTERVAL_SECS must be greater than zero");
        }

        Ok(Self {
            bind_address,
            max_sessions,
            sweep_interval,
        })
    }
}
