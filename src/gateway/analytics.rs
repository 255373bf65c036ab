//! gateway::analytics
//!
//! Best-effort event sink.
//!
//! The gateway notifies the sink after a successful create and ignores
//! whatever the sink returns; a failing sink never changes an operation's
//! result.

use thiserror::Error;

/// Event emitted once per successful pull request creation.
pub const PR_CREATED_EVENT: &str = "pull_request_created";

/// A sink could not record an event.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("analytics sink failed: {0}")]
pub struct AnalyticsError(pub String);

/// Receives named events.
pub trait AnalyticsSink: Send + Sync {
    fn track(&self, event: &str) -> Result<(), AnalyticsError>;
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnalytics;

impl AnalyticsSink for NoopAnalytics {
    fn track(&self, _event: &str) -> Result<(), AnalyticsError> {
        Ok(())
    }
}

/// Emits events as `tracing` records under the `forgegate::analytics` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnalytics;

impl AnalyticsSink for TracingAnalytics {
    fn track(&self, event: &str) -> Result<(), AnalyticsError> {
        tracing::info!(target: "forgegate::analytics", event, "analytics event");
        Ok(())
    }
}
