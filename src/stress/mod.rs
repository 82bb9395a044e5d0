//! Stress Session Core
//!
//! Drives a compute-stress workload, samples its throughput on a fixed
//! cadence and turns the resulting series into display labels.
//!
//! ## Architecture
//! - **Series**: raw + smoothed throughput samples per metric
//! - **Threads**: selectable parallelism levels and repair of stored selections
//! - **Thermal**: best-effort temperature sampling with one-time probe
//! - **Workload**: capability seam for the load generator plus a reference CPU workload
//! - **Notify**: coalescing "results changed" signal
//! - **Controller**: session state machine and sampling thread
//! - **Presenter**: label formatting for live and final views

pub mod controller;
pub mod notify;
pub mod presenter;
pub mod series;
pub mod thermal;
pub mod threads;
pub mod workload;

use std::time::Duration;

pub use controller::{MetricSeries, SessionController, SessionSnapshot, ThermalStatus};
pub use notify::NotificationHub;
pub use presenter::{Formatter, Labels, MetricLabel, StatusLabels, Trend};
pub use series::TimeSeries;
pub use thermal::{TemperatureSource, ThermalReading, ThermalSampler};
pub use threads::{ThreadOptionSet, BASE_THREAD_OPTIONS};
pub use workload::{CpuWorkload, Workload, WorkloadRequest, WorkloadRun};

/// Configuration for a stress session
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Period of the sampling timer
    pub sampling_interval: Duration,
    /// Raw samples averaged into each smoothed value
    pub smoothing_factor: usize,
    /// Ticks recorded but not surfaced at session start
    pub warm_up_samples: u64,
    /// What to run
    pub workload: WorkloadRequest,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            sampling_interval: Duration::from_millis(500),
            smoothing_factor: 2,
            warm_up_samples: 7,
            workload: WorkloadRequest::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.sampling_interval, Duration::from_millis(500));
        assert_eq!(config.smoothing_factor, 2);
        assert_eq!(config.warm_up_samples, 7);
        assert!(config.workload.float_enabled && config.workload.int_enabled);
    }
}
