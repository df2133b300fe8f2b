// ==========================================
// Logging bootstrap
// ==========================================
// tracing + tracing-subscriber, level taken from RUST_LOG
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise logging
///
/// # Environment
/// - RUST_LOG: filter directive (default: info)
///   e.g. RUST_LOG=debug or RUST_LOG=altar_rota::engine=trace
///
/// # Example
/// ```no_run
/// use altar_rota::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Initialise logging as JSON lines (for log shippers)
pub fn init_json() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .init();
}

/// Initialise logging for tests
///
/// Debug level, captured by the test harness. Safe to call more than once.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
