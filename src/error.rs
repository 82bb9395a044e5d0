//! Unified error type hierarchy for xOPS Stress
//!
//! Provides structured error handling with SeriesError, ThermalError,
//! WorkloadError, SessionError and ConfigError.

use std::io;
use thiserror::Error;

/// Statistics queries over a [`TimeSeries`](crate::stress::TimeSeries).
///
/// Both variants indicate a query made against state that cannot answer it,
/// not a runtime condition of the benchmark.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("time series has no smoothed samples yet")]
    EmptySeries,

    #[error("range [{skip}, {skip}+{take}) is out of bounds for {len} smoothed samples")]
    RangeOutOfBounds { skip: usize, take: usize, len: usize },
}

/// Temperature capability errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThermalError {
    /// No temperature sensor on this device; treated as static for the session.
    #[error("temperature sensor not supported on this device")]
    Unsupported,

    /// A sensor exists but this particular read failed.
    #[error("temperature read failed: {0}")]
    ReadFailed(String),
}

/// Errors raised by the compute workload capability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkloadError {
    #[error("workload failed to start: {0}")]
    StartFailed(String),

    /// The workload had nothing to report for this tick (e.g. starved of CPU).
    #[error("no throughput sample this tick")]
    NoSampleThisTick,
}

/// Session lifecycle errors surfaced to the caller of `start()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session could not start: {0}")]
    WorkloadStartFailure(String),

    #[error("session is already running")]
    AlreadyRunning,

    #[error("failed to spawn sampling timer: {0}")]
    TimerSpawn(String),
}

impl SessionError {
    /// Get a user-facing error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            SessionError::WorkloadStartFailure(reason) => {
                format!("The stress test could not be started: {}", reason)
            }
            SessionError::AlreadyRunning => "A stress test is already running".to_string(),
            SessionError::TimerSpawn(reason) => {
                format!("The stress test could not be scheduled: {}", reason)
            }
        }
    }
}

impl From<WorkloadError> for SessionError {
    fn from(e: WorkloadError) -> Self {
        SessionError::WorkloadStartFailure(e.to_string())
    }
}

/// Settings persistence errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid JSON in settings: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("IO error during settings operations: {0}")]
    IoError(#[from] io::Error),

    #[error("No configuration directory available on this platform")]
    ConfigDirUnavailable,
}

/// Top-level result type for session operations.
pub type Result<T, E = SessionError> = std::result::Result<T, E>;
