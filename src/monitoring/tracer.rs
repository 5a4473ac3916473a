/*!
 * Structured Tracing
 * Subscriber setup and per-run spans using the tracing crate
 *
 * Features:
 * - JSON-formatted logs for structured parsing
 * - Per-run spans so overlapping inflations can be told apart
 */

use crate::core::types::Megabytes;
use tracing::{info, span, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - INFLATOR_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() {
    let use_json = std::env::var(crate::core::config::ENV_TRACE_JSON)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    init_tracing_with(use_json);
}

/// Initialize tracing with an explicit output format.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_tracing_with(use_json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        // JSON output for production/parsing
        let installed = registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok();
        if installed {
            info!("Structured tracing initialized with JSON output");
        }
    } else {
        // Human-readable output for development
        let installed = registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
            .is_ok();
        if installed {
            info!("Structured tracing initialized");
        }
    }
}

/// Span covering one inflation run
pub fn inflation_span(run_id: Uuid, target_mb: Megabytes, step_mb: Megabytes) -> Span {
    span!(
        Level::INFO,
        "inflation",
        run_id = %run_id,
        target_mb,
        step_mb,
        allocated_mb = tracing::field::Empty,
    )
}
