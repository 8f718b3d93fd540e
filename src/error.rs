//! Error types for the monitoring core.
//!
//! Most failures here are recovered locally: a missing reading skips the
//! cycle, a malformed field degrades to `Unknown`, a failed dispatch is
//! logged. Only catastrophic loss of a collaborator reaches the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// Reading source unreachable or returned nothing this cycle.
    #[error("reading source unavailable: {0}")]
    SourceUnavailable(String),

    /// A reading field had an unexpected shape; the field is treated as
    /// `Unknown` and the rest of the tick proceeds.
    #[error("malformed reading field: {field}")]
    MalformedReading { field: String },

    /// History store read failed; dependent computation is skipped and a
    /// sentinel report is produced.
    #[error("history store unavailable: {0}")]
    HistoryUnavailable(String),

    /// Notification dispatch failed. Logged only; the alert is still
    /// recorded as fired for dedup purposes.
    #[error("notification dispatch failed: {0}")]
    DispatchFailed(String),

    /// Configuration file present but unparseable.
    #[error("configuration error: {0}")]
    Config(String),
}

pub type MonitorResult<T> = Result<T, MonitorError>;
