//! Structured run logging.
//!
//! Tags every pipeline log line with the run id and the operation, and
//! reports elapsed wall time on completion.

use chrono::{DateTime, Utc};
use tracing::{error, info, warn, Span};
use uuid::Uuid;

/// Logger for one pipeline invocation.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    operation: String,
    started_at: DateTime<Utc>,
}

impl RunLogger {
    /// Create a logger with a fresh run id.
    ///
    /// # Arguments
    /// * `operation` - The kind of run (e.g., "process", "upload_only")
    pub fn new(operation: &str) -> Self {
        Self::with_run_id(&Uuid::new_v4().to_string(), operation)
    }

    pub fn with_run_id(run_id: &str, operation: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            operation: operation.to_string(),
            started_at: Utc::now(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            started_at = %self.started_at.to_rfc3339(),
            "Run started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            "Run progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            run_id = %self.run_id,
            operation = %self.operation,
            "Run warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            run_id = %self.run_id,
            operation = %self.operation,
            elapsed_secs = self.elapsed_secs(),
            "Run failed: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            elapsed_secs = self.elapsed_secs(),
            "Run completed: {}", message
        );
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Seconds since the logger was created.
    pub fn elapsed_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    /// A span carrying the run fields, for instrumenting a whole stage.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "run",
            run_id = %self.run_id,
            operation = %self.operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_logger_creation() {
        let logger = RunLogger::new("process");
        assert_eq!(logger.operation(), "process");
        assert!(Uuid::parse_str(logger.run_id()).is_ok());
        assert!(logger.elapsed_secs() >= 0);
    }

    #[test]
    fn test_run_logger_with_run_id() {
        let logger = RunLogger::with_run_id("run-123", "upload_only");
        assert_eq!(logger.run_id(), "run-123");
        assert_eq!(logger.operation(), "upload_only");
    }
}
