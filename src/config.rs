use crate::error::{AppError, Result};
use crate::services::{ExecutionConfig, FeedConfig, DEFAULT_LOG_CAPACITY};
use crate::types::BotConfig;
use std::env;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Order submission and fill simulation.
    pub execution: ExecutionConfig,
    /// Synthetic market feed.
    pub feed: FeedConfig,
    /// Initial bot configuration.
    pub bot: BotConfig,
    /// Number of operator log entries retained.
    pub log_capacity: usize,
    /// Buffered snapshots per subscriber before it starts lagging.
    pub channel_capacity: usize,
    /// Place a few sample orders on startup (binary only).
    pub demo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            execution: ExecutionConfig::default(),
            feed: FeedConfig::default(),
            bot: BotConfig::default(),
            log_capacity: DEFAULT_LOG_CAPACITY,
            channel_capacity: 256,
            demo: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let feed_symbols = env::var("FEED_SYMBOLS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|symbol| symbol.trim().to_uppercase())
                    .filter(|symbol| !symbol.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.feed.symbols);

        let config = Self {
            execution: ExecutionConfig {
                submit_latency: env_millis("SUBMIT_LATENCY_MS")
                    .unwrap_or(defaults.execution.submit_latency),
                fill_latency: env_millis("FILL_LATENCY_MS")
                    .unwrap_or(defaults.execution.fill_latency),
                allow_terminal_cancel: env_flag("ALLOW_TERMINAL_CANCEL")
                    .unwrap_or(defaults.execution.allow_terminal_cancel),
                cancel_pending_on_shutdown: env_flag("CANCEL_PENDING_ON_SHUTDOWN")
                    .unwrap_or(defaults.execution.cancel_pending_on_shutdown),
            },
            feed: FeedConfig {
                symbols: feed_symbols,
                tick_interval: env_millis("TICK_INTERVAL_MS")
                    .unwrap_or(defaults.feed.tick_interval),
                seed: env::var("FEED_SEED").ok().and_then(|v| v.parse().ok()),
                ..defaults.feed
            },
            bot: defaults.bot,
            log_capacity: env::var("LOG_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.log_capacity),
            channel_capacity: env::var("SNAPSHOT_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.channel_capacity),
            demo: env_flag("PAPERDESK_DEMO").unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.feed.symbols.is_empty() {
            return Err(AppError::Config("feed needs at least one symbol".to_string()));
        }
        if self.feed.tick_interval.is_zero() {
            return Err(AppError::Config("tick interval must be positive".to_string()));
        }
        if self.log_capacity == 0 {
            return Err(AppError::Config("log capacity must be positive".to_string()));
        }
        if self.channel_capacity == 0 {
            return Err(AppError::Config("snapshot channel capacity must be positive".to_string()));
        }
        Ok(())
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key).ok().map(|v| v == "true" || v == "1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.execution.submit_latency, Duration::from_millis(1000));
        assert_eq!(config.execution.fill_latency, Duration::from_millis(2000));
        assert_eq!(config.feed.tick_interval, Duration::from_millis(2000));
        assert_eq!(config.log_capacity, 100);
        assert!(!config.execution.allow_terminal_cancel);
        assert!(config.execution.cancel_pending_on_shutdown);
    }

    #[test]
    fn test_rejects_unusable_settings() {
        let mut config = Config::default();
        config.feed.symbols.clear();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let mut config = Config::default();
        config.feed.tick_interval = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.log_capacity = 0;
        assert!(config.validate().is_err());
    }
}
