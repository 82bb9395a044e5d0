//! xOPS Stress
//!
//! Session core for a compute-stress benchmark: it drives a multi-threaded
//! float/integer workload, samples throughput on a fixed cadence, tracks CPU
//! temperature alongside and renders live and final summary labels.
//!
//! The crate is organized into functional modules:
//! - **error**: Unified error type hierarchy
//! - **models**: Core enums shared across modules
//! - **stress**: Time series, thread options, thermal sampling, workload,
//!   session controller and label formatting
//! - **hardware**: CPU/memory detection and the hwmon temperature source
//! - **config**: Persisted benchmark preferences
//! - **log_collector**: Non-blocking `log` backend

// Core foundational modules
pub mod error;
pub mod models;

// Session core
pub mod stress;

// Device facts and sensors
pub mod hardware;

// Persisted preferences
pub mod config;

// Robust, decoupled logging system
pub mod log_collector;

// Re-export the log crate for macro usage
pub use log;

pub use log_collector::{LogCollector, LogLine};

// ============================================================================
// PUBLIC RE-EXPORTS FOR CONVENIENCE
// ============================================================================

pub use error::{ConfigError, Result, SeriesError, SessionError, ThermalError, WorkloadError};

pub use models::{Metric, SessionPhase};

pub use stress::{
    CpuWorkload, Formatter, Labels, MetricLabel, MetricSeries, NotificationHub, SessionConfig,
    SessionController, SessionSnapshot, StatusLabels, TemperatureSource, ThermalReading,
    ThermalSampler, ThermalStatus, ThreadOptionSet, TimeSeries, Trend, Workload, WorkloadRequest,
    WorkloadRun, BASE_THREAD_OPTIONS,
};

pub use hardware::{DeviceInfo, HwmonSensor};

pub use config::{BenchSettings, JsonFileStore, MemoryStore, SettingsStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert_eq!(VERSION, "0.1.0");
    }

    #[test]
    fn test_error_reexport() {
        let _: Result<i32> = Ok(42);
        let _: Result<(), SeriesError> = Err(SeriesError::EmptySeries);
    }

    #[test]
    fn test_enum_variants_accessible() {
        assert_eq!(Metric::Gflops, Metric::Gflops);
        assert_eq!(SessionPhase::default(), SessionPhase::NotStarted);
    }
}
