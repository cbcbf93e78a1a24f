//! Editor configuration.
//!
//! Hosts usually build an [`EditorConfig`] from the environment at startup:
//!
//! - `SLIDEDECK_HISTORY_DEPTH`: maximum undoable commands per presentation (default 100)
//! - `SLIDEDECK_STORE_TIMEOUT_MS`: bound on each store round-trip, in milliseconds (unset = unbounded)

use std::time::Duration;

use thiserror::Error;

use slidedeck_commands::DEFAULT_MAX_DEPTH;

pub const HISTORY_DEPTH_VAR: &str = "SLIDEDECK_HISTORY_DEPTH";
pub const STORE_TIMEOUT_VAR: &str = "SLIDEDECK_STORE_TIMEOUT_MS";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Maximum number of undoable commands kept per presentation (at least 1).
    pub max_history_depth: usize,
    /// Optional bound on each command's store round-trip; elapsing counts as a failure.
    pub store_timeout: Option<Duration>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history_depth: DEFAULT_MAX_DEPTH,
            store_timeout: None,
        }
    }
}

impl EditorConfig {
    /// Depth 0 is treated as 1.
    pub fn with_max_history_depth(mut self, depth: usize) -> Self {
        if depth == 0 {
            tracing::warn!("history depth 0 requested; using 1");
        }
        self.max_history_depth = depth.max(1);
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = Some(timeout);
        self
    }

    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`; absent keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(HISTORY_DEPTH_VAR) {
            let depth = parse_number(HISTORY_DEPTH_VAR, &raw)?;
            config = config.with_max_history_depth(depth as usize);
        }

        if let Some(raw) = lookup(STORE_TIMEOUT_VAR) {
            let millis = parse_number(STORE_TIMEOUT_VAR, &raw)?;
            if millis == 0 {
                return Err(ConfigError::Invalid {
                    key: STORE_TIMEOUT_VAR,
                    value: raw,
                    reason: "timeout must be positive".to_string(),
                });
            }
            config = config.with_store_timeout(Duration::from_millis(millis));
        }

        Ok(config)
    }
}

fn parse_number(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
