//! Shared fakes for session integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use xops_stress::stress::{SessionConfig, WorkloadRequest};
use xops_stress::{Metric, TemperatureSource, ThermalError, Workload, WorkloadError, WorkloadRun};

/// Workload reporting a fixed throughput per metric
#[derive(Default)]
pub struct FakeWorkload {
    pub gflops: f64,
    pub ginops: f64,
    pub fail_start: bool,
    pub panic_first_sample: bool,
    pub starts: Arc<AtomicUsize>,
    pub stopped: Arc<AtomicBool>,
}

impl FakeWorkload {
    pub fn steady(gflops: f64, ginops: f64) -> Self {
        FakeWorkload {
            gflops,
            ginops,
            ..FakeWorkload::default()
        }
    }

    pub fn failing() -> Self {
        FakeWorkload {
            fail_start: true,
            ..FakeWorkload::default()
        }
    }

    /// Steady workload whose very first sample panics
    pub fn panics_once(gflops: f64, ginops: f64) -> Self {
        FakeWorkload {
            panic_first_sample: true,
            ..FakeWorkload::steady(gflops, ginops)
        }
    }
}

impl Workload for FakeWorkload {
    fn start(&self, _request: &WorkloadRequest) -> Result<Box<dyn WorkloadRun>, WorkloadError> {
        if self.fail_start {
            return Err(WorkloadError::StartFailed("device busy".to_string()));
        }
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.stopped.store(false, Ordering::SeqCst);
        Ok(Box::new(FakeRun {
            gflops: self.gflops,
            ginops: self.ginops,
            panic_pending: self.panic_first_sample,
            stopped: Arc::clone(&self.stopped),
        }))
    }
}

struct FakeRun {
    gflops: f64,
    ginops: f64,
    panic_pending: bool,
    stopped: Arc<AtomicBool>,
}

impl WorkloadRun for FakeRun {
    fn sample(&mut self, metric: Metric) -> Result<f64, WorkloadError> {
        if self.panic_pending {
            self.panic_pending = false;
            panic!("performance counter read failed");
        }
        match metric {
            Metric::Gflops => Ok(self.gflops),
            Metric::Ginops => Ok(self.ginops),
        }
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

/// Temperature source with a fixed answer that counts reads
pub struct FakeSensor {
    pub celsius: Option<f64>,
    pub reads: Arc<AtomicUsize>,
}

impl FakeSensor {
    pub fn at(celsius: f64) -> Self {
        FakeSensor {
            celsius: Some(celsius),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn missing() -> Self {
        FakeSensor {
            celsius: None,
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl TemperatureSource for FakeSensor {
    fn temperature(&self) -> Result<f64, ThermalError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.celsius.ok_or(ThermalError::Unsupported)
    }
}

/// Fast-ticking session with both metrics tracked
pub fn fast_config(warm_up_samples: u64) -> SessionConfig {
    SessionConfig {
        sampling_interval: Duration::from_millis(10),
        smoothing_factor: 2,
        warm_up_samples,
        workload: WorkloadRequest {
            float_threads: 8,
            int_threads: 16,
            float_enabled: true,
            int_enabled: true,
            float_64bit: false,
            int_64bit: false,
        },
    }
}
