/*!
 * Structured Tracing
 * Subscriber setup and scheduling spans using the tracing crate
 *
 * Environment variables:
 * - RUST_LOG: log filter (default: info)
 * - KERNEL_TRACE_JSON: emit JSON lines instead of compact text
 */

use crate::core::types::Tick;
use tracing::{info, span, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Output format for trace events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceFormat {
    Compact,
    Json,
}

impl TraceFormat {
    /// Format requested through `KERNEL_TRACE_JSON`
    pub fn from_env() -> Self {
        let json = std::env::var("KERNEL_TRACE_JSON")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if json {
            Self::Json
        } else {
            Self::Compact
        }
    }
}

/// Install the global subscriber
///
/// Returns false when a subscriber was already installed, which happens
/// when tests or embedding code set one up first.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = TraceFormat::from_env();
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match format {
        TraceFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
            .is_ok(),
        TraceFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::NONE)
                    .compact(),
            )
            .try_init()
            .is_ok(),
    };

    if installed {
        info!(?format, "Structured tracing initialized");
    }
    installed
}

/// Span covering one scheduler entry point at a given tick
pub fn span_scheduling(operation: &'static str, tick: Tick) -> Span {
    span!(Level::DEBUG, "scheduling", operation, tick)
}
