/*!
 * Tracing
 * Subscriber setup and timing spans for lifecycle operations
 *
 * Process code logs through the `log` facade; the `tracing-log` bridge
 * forwards those records into the subscriber installed here.
 */

use crate::core::types::Pid;
use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Lifecycle operations slower than this are reported at warn level
pub const SLOW_OPERATION_THRESHOLD: Duration = Duration::from_millis(10);

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - PROCESS_TRACE_JSON: Enable JSON output (default: false)
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("PROCESS_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "Structured tracing initialized");
    }
    installed
}

/// Timing span around one lifecycle operation on one process
pub struct LifecycleSpan {
    span: tracing::Span,
    start: Instant,
    operation: &'static str,
    pid: Pid,
}

impl LifecycleSpan {
    pub fn new(operation: &'static str, pid: Pid) -> Self {
        let span = span!(
            Level::DEBUG,
            "lifecycle",
            operation = operation,
            pid = pid,
            duration_us = tracing::field::Empty,
            result = tracing::field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
            operation,
            pid,
        }
    }

    /// Record the outcome and close the span
    pub fn finish<T, E: std::fmt::Display>(self, result: &Result<T, E>) {
        match result {
            Ok(_) => {
                self.span.record("result", "success");
            }
            Err(e) => {
                self.span.record("result", "error");
                let _entered = self.span.enter();
                warn!(operation = self.operation, pid = self.pid, error = %e, "lifecycle operation failed");
            }
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for LifecycleSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("duration_us", duration.as_micros() as u64);
        let _entered = self.span.enter();

        if duration > SLOW_OPERATION_THRESHOLD {
            warn!(
                operation = self.operation,
                pid = self.pid,
                duration_ms = duration.as_millis() as u64,
                "slow lifecycle operation"
            );
        } else {
            debug!(
                operation = self.operation,
                pid = self.pid,
                duration_us = duration.as_micros() as u64,
                "lifecycle operation completed"
            );
        }
    }
}
