//! Tracing and logging setup shared by slidedeck hosts.

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use self::tracing::{DEFAULT_FILTER, ObservabilityError};

/// Initialize process-wide tracing/logging, filtered by `RUST_LOG`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Like [`init`], with an explicit filter directive instead of `RUST_LOG`.
pub fn init_with_filter(directive: &str) -> Result<(), ObservabilityError> {
    tracing::init_with_filter(directive)
}

/// Human-readable output captured by the test harness.
pub fn init_for_tests() {
    tracing::init_for_tests();
}
