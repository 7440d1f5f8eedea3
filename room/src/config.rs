//! Configuration for the Fictionary binary.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Log filter used when `RUST_LOG` is unset (default: `info`)
    pub log_level: String,
    /// Fixed shuffle seed; random per ballot when unset
    pub shuffle_seed: Option<u32>,
    /// Metrics configuration
    pub metrics: MetricsConfig,
    /// Display names of the players in the demo game
    pub demo_players: Vec<String>,
}

/// Prometheus exporter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Whether to install the Prometheus recorder
    pub enabled: bool,
    /// Host part of the address reported by the metrics recorder; nothing
    /// listens on it, the demo prints the rendered metrics instead
    pub host: String,
    /// Port part of the same address
    pub port: u16,
}

impl Config {
    /// Load configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    ///
    /// Unparseable values fall back to their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            shuffle_seed: lookup("FICTIONARY_SHUFFLE_SEED").and_then(|s| s.trim().parse().ok()),
            metrics: MetricsConfig {
                enabled: lookup("FICTIONARY_METRICS_ENABLED")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(false),
                host: lookup("METRICS_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: lookup("METRICS_PORT")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(9090),
            },
            demo_players: lookup("FICTIONARY_DEMO_PLAYERS")
                .map(|names| {
                    names
                        .split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(String::from)
                        .collect::<Vec<_>>()
                })
                .filter(|names| !names.is_empty())
                .unwrap_or_else(|| vec!["Alice".into(), "Bob".into(), "Carol".into()]),
        }
    }

    /// `host:port` handed to `MetricsServer::new`. Only recorded, never bound.
    #[must_use]
    pub fn metrics_addr(&self) -> String {
        format!("{}:{}", self.metrics.host, self.metrics.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
