//! Structured tracing helpers shared by the API clients and tools

use std::time::Instant;

/// Logs the elapsed time of an operation when dropped.
///
/// Callers may record how many items the operation produced so the completion
/// line carries a result size alongside the duration.
pub struct Timer {
    start: Instant,
    operation: String,
    items: Option<usize>,
}

impl Timer {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            operation: operation.into(),
            items: None,
        }
    }

    /// Record the number of items produced by the timed operation
    pub fn record_items(&mut self, items: usize) {
        self.items = Some(items);
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration_ms = self.elapsed_ms();
        match self.items {
            Some(items) => tracing::debug!(
                operation = %self.operation,
                duration_ms = duration_ms,
                items = items,
                "Operation completed"
            ),
            None => tracing::debug!(
                operation = %self.operation,
                duration_ms = duration_ms,
                "Operation completed"
            ),
        }
    }
}

/// Log a failed API operation with the service it was talking to
pub fn log_error(service: &str, operation: &str, error: &impl std::error::Error) {
    tracing::error!(
        service = %service,
        operation = %operation,
        error = %error,
        error_kind = std::any::type_name_of_val(error),
        "Operation failed"
    );
}
