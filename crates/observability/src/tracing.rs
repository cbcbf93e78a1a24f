//! Tracing/logging initialization.
//!
//! JSON lines with timestamps and targets; the `audit` target carries command
//! records and can be routed separately by filter (e.g. `RUST_LOG=audit=info`).

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObservabilityError {
    #[error("invalid log filter '{directive}': {reason}")]
    InvalidFilter { directive: String, reason: String },
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    install(filter);
}

pub fn init_with_filter(directive: &str) -> Result<(), ObservabilityError> {
    let filter = EnvFilter::try_new(directive).map_err(|e| ObservabilityError::InvalidFilter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })?;
    install(filter);
    Ok(())
}

pub fn init_for_tests() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

fn install(filter: EnvFilter) {
    // JSON logs + timestamps; a second install fails quietly.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .try_init();
}
