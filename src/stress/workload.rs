//! Compute Workload
//!
//! The session controller drives load through the [`Workload`] capability and
//! polls it for throughput once per tick. [`CpuWorkload`] is the reference
//! implementation used by the command-line runner: it spawns background
//! worker threads that spin on multiply-add loops and count completed
//! operations.
//!
//! ## Worker Types:
//! - **Float**: fused multiply-add chains in `f32` or `f64` (reported as GFLOPS)
//! - **Integer**: wrapping multiply-add chains in `i32` or `i64` (reported as GINOPS)

use super::threads::ThreadOptionSet;
use crate::error::WorkloadError;
use crate::models::Metric;
use serde::{Deserialize, Serialize};
use std::hint::black_box;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Parameters for starting a workload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadRequest {
    /// Worker threads running the floating-point kernel
    pub float_threads: u32,
    /// Worker threads running the integer kernel
    pub int_threads: u32,
    /// Run the floating-point kernel (tracks GFLOPS)
    pub float_enabled: bool,
    /// Run the integer kernel (tracks GINOPS)
    pub int_enabled: bool,
    /// Use 64-bit floats instead of 32-bit
    pub float_64bit: bool,
    /// Use 64-bit integers instead of 32-bit
    pub int_64bit: bool,
}

impl WorkloadRequest {
    /// Metrics this request produces, in display order
    pub fn tracked_metrics(&self) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|m| self.is_enabled(*m))
            .collect()
    }

    pub fn is_enabled(&self, metric: Metric) -> bool {
        match metric {
            Metric::Gflops => self.float_enabled,
            Metric::Ginops => self.int_enabled,
        }
    }

    pub fn threads_for(&self, metric: Metric) -> u32 {
        match metric {
            Metric::Gflops => self.float_threads,
            Metric::Ginops => self.int_threads,
        }
    }
}

impl Default for WorkloadRequest {
    fn default() -> Self {
        let threads = ThreadOptionSet::detect().recommended();
        WorkloadRequest {
            float_threads: threads,
            int_threads: threads,
            float_enabled: true,
            int_enabled: true,
            float_64bit: false,
            int_64bit: false,
        }
    }
}

/// Capability that can start a compute workload
pub trait Workload: Send + Sync {
    fn start(&self, request: &WorkloadRequest) -> Result<Box<dyn WorkloadRun>, WorkloadError>;
}

/// A running workload
pub trait WorkloadRun: Send {
    /// Throughput for `metric` since the previous call, in billions of ops/s
    fn sample(&mut self, metric: Metric) -> Result<f64, WorkloadError>;

    /// Halt all load. Must be idempotent.
    fn stop(&mut self);
}

/// Operations completed by one multiply-add batch (mul + add per element step)
const OPS_PER_BATCH: u64 = 2 * BATCH_STEPS as u64 * LANES as u64;
const BATCH_STEPS: usize = 4096;
const LANES: usize = 8;

/// Reference multi-threaded CPU workload
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuWorkload;

impl Workload for CpuWorkload {
    fn start(&self, request: &WorkloadRequest) -> Result<Box<dyn WorkloadRun>, WorkloadError> {
        if !request.float_enabled && !request.int_enabled {
            return Err(WorkloadError::StartFailed(
                "neither float nor integer workload enabled".to_string(),
            ));
        }

        let mut run = CpuWorkloadRun::new();

        if request.float_enabled {
            let kernel = if request.float_64bit { float64_kernel } else { float32_kernel };
            run.spawn_workers(Metric::Gflops, request.float_threads, kernel)?;
        }
        if request.int_enabled {
            let kernel = if request.int_64bit { int64_kernel } else { int32_kernel };
            run.spawn_workers(Metric::Ginops, request.int_threads, kernel)?;
        }

        log::info!(
            "[Workload] Started {} float ({}-bit) and {} integer ({}-bit) workers",
            if request.float_enabled { request.float_threads } else { 0 },
            if request.float_64bit { 64 } else { 32 },
            if request.int_enabled { request.int_threads } else { 0 },
            if request.int_64bit { 64 } else { 32 },
        );

        Ok(Box::new(run))
    }
}

/// Operation counter for one metric plus the point it was last sampled
struct Counter {
    metric: Metric,
    ops: Arc<AtomicU64>,
    last_ops: u64,
    last_at: Instant,
}

/// Worker threads of a running [`CpuWorkload`]
pub struct CpuWorkloadRun {
    stop_flag: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
    counters: Vec<Counter>,
    stopped: bool,
}

impl CpuWorkloadRun {
    fn new() -> Self {
        CpuWorkloadRun {
            stop_flag: Arc::new(AtomicBool::new(false)),
            handles: Vec::new(),
            counters: Vec::new(),
            stopped: false,
        }
    }

    fn spawn_workers(
        &mut self,
        metric: Metric,
        threads: u32,
        kernel: fn(&AtomicBool, &AtomicU64),
    ) -> Result<(), WorkloadError> {
        let ops = Arc::new(AtomicU64::new(0));

        for i in 0..threads.max(1) {
            let stop_flag = Arc::clone(&self.stop_flag);
            let ops = Arc::clone(&ops);

            let handle = thread::Builder::new()
                .name(format!("xops-{}-{}", metric.unit().to_lowercase(), i))
                .spawn(move || kernel(&stop_flag, &ops))
                .map_err(|e| {
                    WorkloadError::StartFailed(format!("failed to spawn {} worker: {}", metric, e))
                });

            match handle {
                Ok(handle) => self.handles.push(handle),
                Err(e) => {
                    self.stop();
                    return Err(e);
                }
            }
        }

        self.counters.push(Counter {
            metric,
            ops,
            last_ops: 0,
            last_at: Instant::now(),
        });
        Ok(())
    }
}

impl WorkloadRun for CpuWorkloadRun {
    fn sample(&mut self, metric: Metric) -> Result<f64, WorkloadError> {
        let counter = self
            .counters
            .iter_mut()
            .find(|c| c.metric == metric)
            .ok_or(WorkloadError::NoSampleThisTick)?;

        let now = Instant::now();
        let ops = counter.ops.load(Ordering::Relaxed);
        let delta_ops = ops.saturating_sub(counter.last_ops);
        let delta_secs = now.duration_since(counter.last_at).as_secs_f64();

        if delta_ops == 0 || delta_secs <= 0.0 {
            return Err(WorkloadError::NoSampleThisTick);
        }

        counter.last_ops = ops;
        counter.last_at = now;
        Ok(delta_ops as f64 / delta_secs / 1e9)
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stop_flag.store(true, Ordering::Release);

        let total = self.handles.len();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::error!("[Workload] ✗ Worker panicked during shutdown");
            }
        }
        self.stopped = true;
        log::info!("[Workload] All {} workers stopped", total);
    }
}

impl Drop for CpuWorkloadRun {
    fn drop(&mut self) {
        if !self.stopped {
            log::warn!("[Workload] Drop: stopping {} active workers", self.handles.len());
            self.stop();
        }
    }
}

fn float32_kernel(stop_flag: &AtomicBool, ops: &AtomicU64) {
    let mut acc = [1.0f32; LANES];
    let mul = black_box(0.999_999f32);
    let add = black_box(0.000_001f32);
    while !stop_flag.load(Ordering::Relaxed) {
        for _ in 0..BATCH_STEPS {
            for lane in acc.iter_mut() {
                *lane = lane.mul_add(mul, add);
            }
        }
        black_box(&acc);
        ops.fetch_add(OPS_PER_BATCH, Ordering::Relaxed);
    }
}

fn float64_kernel(stop_flag: &AtomicBool, ops: &AtomicU64) {
    let mut acc = [1.0f64; LANES];
    let mul = black_box(0.999_999_999f64);
    let add = black_box(0.000_000_001f64);
    while !stop_flag.load(Ordering::Relaxed) {
        for _ in 0..BATCH_STEPS {
            for lane in acc.iter_mut() {
                *lane = lane.mul_add(mul, add);
            }
        }
        black_box(&acc);
        ops.fetch_add(OPS_PER_BATCH, Ordering::Relaxed);
    }
}

fn int32_kernel(stop_flag: &AtomicBool, ops: &AtomicU64) {
    let mut acc = [1i32; LANES];
    let mul = black_box(1_103_515_245i32);
    let add = black_box(12_345i32);
    while !stop_flag.load(Ordering::Relaxed) {
        for _ in 0..BATCH_STEPS {
            for lane in acc.iter_mut() {
                *lane = lane.wrapping_mul(mul).wrapping_add(add);
            }
        }
        black_box(&acc);
        ops.fetch_add(OPS_PER_BATCH, Ordering::Relaxed);
    }
}

fn int64_kernel(stop_flag: &AtomicBool, ops: &AtomicU64) {
    let mut acc = [1i64; LANES];
    let mul = black_box(6_364_136_223_846_793_005i64);
    let add = black_box(1_442_695_040_888_963_407i64);
    while !stop_flag.load(Ordering::Relaxed) {
        for _ in 0..BATCH_STEPS {
            for lane in acc.iter_mut() {
                *lane = lane.wrapping_mul(mul).wrapping_add(add);
            }
        }
        black_box(&acc);
        ops.fetch_add(OPS_PER_BATCH, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn small_request() -> WorkloadRequest {
        WorkloadRequest {
            float_threads: 1,
            int_threads: 1,
            float_enabled: true,
            int_enabled: true,
            float_64bit: false,
            int_64bit: true,
        }
    }

    #[test]
    fn test_tracked_metrics_follow_enable_flags() {
        let mut request = small_request();
        assert_eq!(request.tracked_metrics(), vec![Metric::Gflops, Metric::Ginops]);

        request.float_enabled = false;
        assert_eq!(request.tracked_metrics(), vec![Metric::Ginops]);
        assert_eq!(request.threads_for(Metric::Ginops), 1);
    }

    #[test]
    fn test_default_request_uses_recommended_threads() {
        let options = ThreadOptionSet::detect();
        let request = WorkloadRequest::default();
        assert_eq!(request.float_threads, options.recommended());
        assert_eq!(request.int_threads, options.recommended());
        assert!(options.contains(request.float_threads));
    }

    #[test]
    fn test_start_rejects_empty_request() {
        let mut request = small_request();
        request.float_enabled = false;
        request.int_enabled = false;
        assert!(matches!(
            CpuWorkload.start(&request),
            Err(WorkloadError::StartFailed(_))
        ));
    }

    #[test]
    fn test_cpu_workload_reports_throughput() {
        let mut run = CpuWorkload.start(&small_request()).unwrap();
        thread::sleep(Duration::from_millis(100));

        let gflops = run.sample(Metric::Gflops).unwrap();
        let ginops = run.sample(Metric::Ginops).unwrap();
        assert!(gflops > 0.0);
        assert!(ginops > 0.0);

        run.stop();
        run.stop();
    }

    #[test]
    fn test_untracked_metric_has_no_sample() {
        let mut request = small_request();
        request.int_enabled = false;
        let mut run = CpuWorkload.start(&request).unwrap();
        assert_eq!(run.sample(Metric::Ginops), Err(WorkloadError::NoSampleThisTick));
        run.stop();
    }
}
