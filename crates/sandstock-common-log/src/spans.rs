use std::time::{Duration, Instant};
use tracing::{info_span, Span};

/// Span covering one command run against the entity store.
pub fn store_span(operation: &'static str) -> Span {
    info_span!("store", op = operation)
}

/// Span covering one drain-and-commit of the change log queue.
pub fn flush_span(queued: usize) -> Span {
    info_span!("changelog_flush", queued, flushed = tracing::field::Empty)
}

/// Timing utility for operations.
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }

    /// Complete the timer and record duration.
    pub fn finish(self) -> Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_ms = %duration.as_millis(),
            "operation completed"
        );
        duration
    }
}
