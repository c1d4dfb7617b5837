//! Timeout utilities for bounding filesystem and collaborator work.
//!
//! Two flavours: an async hard timeout built on tokio for callers that run
//! tiers on the blocking pool, and a synchronous [`Deadline`] checked at the
//! natural suspension points of a tier (between candidate opens, between
//! tiers).

use crate::error::{ClassifyError, Result};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, trace};

/// Default budget for the executable tier (resolve + inspect), in milliseconds.
pub const DEFAULT_EXECUTABLE_TIMEOUT_MS: u64 = 2_000;

/// Default budget for one privileged collaborator round-trip, in milliseconds.
pub const DEFAULT_PRIVILEGED_TIMEOUT_MS: u64 = 5_000;

/// Timeout configuration for one async operation
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Maximum duration for the operation
    pub duration: Duration,
    /// Operation name for logging
    pub operation_name: String,
}

impl TimeoutConfig {
    /// Create a new timeout configuration
    pub fn from_millis(millis: u64, operation: impl Into<String>) -> Self {
        Self {
            duration: Duration::from_millis(millis),
            operation_name: operation.into(),
        }
    }
}

/// Execute an async operation with a timeout.
///
/// Expiry drops the future and yields [`ClassifyError::Timeout`].
pub async fn with_timeout<T, F>(config: TimeoutConfig, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    trace!(
        operation = %config.operation_name,
        timeout_ms = config.duration.as_millis() as u64,
        "Starting operation"
    );

    match timeout(config.duration, future).await {
        Ok(result) => result,
        Err(_) => {
            debug!(
                operation = %config.operation_name,
                timeout_ms = config.duration.as_millis() as u64,
                "Operation timed out"
            );
            Err(ClassifyError::Timeout {
                millis: config.duration.as_millis() as u64,
            })
        }
    }
}

/// Synchronous time budget shared by the steps of one tier.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    /// A deadline expiring `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget: Some(budget),
        }
    }

    /// A deadline expiring `millis` milliseconds from now.
    pub fn after_millis(millis: u64) -> Self {
        Self::after(Duration::from_millis(millis))
    }

    /// A deadline that never expires.
    pub fn unbounded() -> Self {
        Self {
            start: Instant::now(),
            budget: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.budget {
            Some(budget) => self.start.elapsed() >= budget,
            None => false,
        }
    }

    /// Time left before expiry; `None` for an unbounded deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.budget
            .map(|budget| budget.saturating_sub(self.start.elapsed()))
    }

    /// Fail with [`ClassifyError::Timeout`] once the budget is spent.
    pub fn check(&self, operation: &str) -> Result<()> {
        if !self.is_expired() {
            return Ok(());
        }
        let millis = self.budget.map(|b| b.as_millis() as u64).unwrap_or(0);
        debug!(operation, timeout_ms = millis, "Deadline expired");
        Err(ClassifyError::Timeout { millis })
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_async_timeout_success() {
        let config = TimeoutConfig::from_millis(1_000, "test_operation");

        let result = with_timeout(config, async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(42)
        })
        .await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_async_timeout_failure() {
        let config = TimeoutConfig::from_millis(50, "test_operation");

        let result: Result<i32> = with_timeout(config, async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok(42)
        })
        .await;

        assert!(matches!(result, Err(ClassifyError::Timeout { millis: 50 })));
    }

    #[tokio::test]
    async fn test_async_inner_error_passes_through() {
        let config = TimeoutConfig::from_millis(1_000, "test_operation");
        let result: Result<i32> = with_timeout(config, async { Err(ClassifyError::NoMatch) }).await;
        assert!(matches!(result, Err(ClassifyError::NoMatch)));
    }

    #[test]
    fn test_deadline_expiry() {
        let deadline = Deadline::after(Duration::ZERO);
        assert!(deadline.is_expired());
        assert!(matches!(
            deadline.check("resolve"),
            Err(ClassifyError::Timeout { .. })
        ));
        assert_eq!(deadline.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_deadline_unbounded() {
        let deadline = Deadline::unbounded();
        assert!(!deadline.is_expired());
        assert!(deadline.check("resolve").is_ok());
        assert_eq!(deadline.remaining(), None);
    }

    #[test]
    fn test_deadline_generous_budget() {
        let deadline = Deadline::after_millis(60_000);
        assert!(deadline.check("resolve").is_ok());
        assert!(deadline.remaining().unwrap() > Duration::from_secs(1));
    }
}
