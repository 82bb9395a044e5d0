//! Stress Session Controller
//!
//! Owns the session state machine and the sampling thread.
//!
//! ```text
//! NotStarted ──start()──► WarmingUp ──(warm-up ticks done)──► Running
//!      ▲                      │                                  │
//!      │ start() failed       └────────────stop()────────────────┤
//!      │                                                         ▼
//!      └───────────────────────────start()─────────────────── Stopped
//! ```
//!
//! A single named thread (`xops-sampler`) polls the workload once per
//! interval, appends to the per-metric series and raises a payload-free
//! notification. All state mutation happens on that thread; readers take an
//! owned [`SessionSnapshot`] under the state lock.

use super::notify::NotificationHub;
use super::presenter::{Formatter, StatusLabels};
use super::series::TimeSeries;
use super::thermal::{TemperatureSource, ThermalReading, ThermalSampler};
use super::workload::{Workload, WorkloadRun};
use super::SessionConfig;
use crate::error::{SessionError, WorkloadError};
use crate::models::{Metric, SessionPhase};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Thermal side-channel as seen by readers
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ThermalStatus {
    /// Probe failed or no session yet
    #[default]
    Unavailable,
    /// Sensor present; `None` until the first post-warm-up reading
    Available(Option<ThermalReading>),
}

/// One tracked metric and its samples
#[derive(Clone, Debug, PartialEq)]
pub struct MetricSeries {
    pub metric: Metric,
    /// Worker threads driving this metric
    pub threads: u32,
    pub series: TimeSeries,
}

/// Consistent copy of session state taken under the state lock
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    /// Sampling ticks since start, including warm-up
    pub tick_count: u64,
    /// Results-updated notifications since start
    pub update_count: u64,
    /// Time since start, frozen once stopped
    pub elapsed: Duration,
    pub series: Vec<MetricSeries>,
    pub thermal: ThermalStatus,
    /// Per-metric ticks where the workload had nothing to report
    pub missed_samples: u64,
}

impl SessionSnapshot {
    pub fn series(&self, metric: Metric) -> Option<&TimeSeries> {
        self.series
            .iter()
            .find(|s| s.metric == metric)
            .map(|s| &s.series)
    }

    /// Total smoothed values across all metrics
    pub fn recorded_count(&self) -> usize {
        self.series.iter().map(|s| s.series.len()).sum()
    }
}

/// Mutable session state, written only by the sampling thread and by
/// `start()`/`stop()` while the thread is not running
#[derive(Default)]
struct SessionState {
    snapshot: SessionSnapshot,
    started_at: Option<Instant>,
    frozen_elapsed: Option<Duration>,
    /// Recorded count at the last surfaced tick
    surfaced_count: usize,
    final_labels: Option<StatusLabels>,
}

impl SessionState {
    fn fresh(config: &SessionConfig, thermal_enabled: bool) -> Self {
        let request = &config.workload;
        let series = request
            .tracked_metrics()
            .into_iter()
            .map(|metric| MetricSeries {
                metric,
                threads: request.threads_for(metric),
                series: TimeSeries::new(config.smoothing_factor),
            })
            .collect();

        let phase = if config.warm_up_samples > 0 {
            SessionPhase::WarmingUp
        } else {
            SessionPhase::Running
        };

        SessionState {
            snapshot: SessionSnapshot {
                phase,
                series,
                thermal: if thermal_enabled {
                    ThermalStatus::Available(None)
                } else {
                    ThermalStatus::Unavailable
                },
                ..SessionSnapshot::default()
            },
            started_at: Some(Instant::now()),
            ..SessionState::default()
        }
    }

    fn elapsed(&self) -> Duration {
        match (self.frozen_elapsed, self.started_at) {
            (Some(frozen), _) => frozen,
            (None, Some(started)) => started.elapsed(),
            (None, None) => Duration::ZERO,
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        let mut snapshot = self.snapshot.clone();
        snapshot.elapsed = self.elapsed();
        snapshot
    }

    fn append(&mut self, metric: Metric, value: f64) {
        if let Some(s) = self.snapshot.series.iter_mut().find(|s| s.metric == metric) {
            s.series.append(value);
        }
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// The sampling thread's half of a session
struct Sampler {
    state: Arc<Mutex<SessionState>>,
    hub: NotificationHub,
    run: Box<dyn WorkloadRun>,
    thermal: ThermalSampler,
    metrics: Vec<Metric>,
    interval: Duration,
    warm_up_samples: u64,
}

impl Sampler {
    /// Tick until `stop_rx` fires, then hand the workload back for shutdown
    fn run(mut self, stop_rx: Receiver<()>) -> Box<dyn WorkloadRun> {
        let mut deadline = Instant::now() + self.interval;

        loop {
            let wait = deadline.saturating_duration_since(Instant::now());
            match stop_rx.recv_timeout(wait) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }

            match panic::catch_unwind(AssertUnwindSafe(|| self.tick())) {
                Ok(true) => self.hub.notify(),
                Ok(false) => {}
                Err(_) => log::error!("[Sampler] ✗ Tick panicked; continuing with next tick"),
            }

            deadline += self.interval;
            let now = Instant::now();
            if deadline < now {
                log::debug!("[Sampler] Tick overran its interval, skipping missed deadlines");
                deadline = now + self.interval;
            }
        }

        self.run
    }

    /// One sampling tick. Returns whether a notification should be raised.
    ///
    /// The tick is counted before anything that can fail: a workload panic
    /// while sampling a metric is recorded as a gap for that metric, and any
    /// later panic is caught by `run` after the tick has already advanced
    /// warm-up.
    fn tick(&mut self) -> bool {
        let mut samples: Vec<(Metric, Result<f64, WorkloadError>)> =
            Vec::with_capacity(self.metrics.len());
        for &metric in &self.metrics {
            samples.push((metric, sample_guarded(&mut *self.run, metric)));
        }

        let count = {
            let mut state = lock(&self.state);
            let warming_up = state.snapshot.tick_count < self.warm_up_samples;
            state.snapshot.tick_count += 1;

            for (metric, sample) in samples {
                match sample {
                    Ok(value) => state.append(metric, value),
                    Err(e) => {
                        state.snapshot.missed_samples += 1;
                        log::debug!(
                            "[Sampler] {} gap at tick {}: {}",
                            metric,
                            state.snapshot.tick_count,
                            e
                        );
                    }
                }
            }

            if warming_up {
                return false;
            }

            if state.snapshot.phase == SessionPhase::WarmingUp {
                state.snapshot.phase = SessionPhase::Running;
                log::info!("[Sampler] Warm-up complete after {} ticks", self.warm_up_samples);
            }

            let count = state.snapshot.recorded_count();
            if count == state.surfaced_count {
                return false;
            }
            count
        };

        // Temperature is only read for ticks that surface new results.
        let reading = self.thermal.sample();

        let mut state = lock(&self.state);
        if let Some(reading) = reading {
            state.snapshot.thermal = ThermalStatus::Available(Some(reading));
        }
        state.surfaced_count = count;
        state.snapshot.update_count += 1;
        true
    }
}

/// Sample one metric, turning a workload panic into a gap
fn sample_guarded(run: &mut dyn WorkloadRun, metric: Metric) -> Result<f64, WorkloadError> {
    match panic::catch_unwind(AssertUnwindSafe(|| run.sample(metric))) {
        Ok(sample) => sample,
        Err(_) => {
            log::warn!("[Sampler] ✗ Workload panicked while sampling {}", metric);
            Err(WorkloadError::NoSampleThisTick)
        }
    }
}

struct SamplerHandle {
    stop_tx: Sender<()>,
    join: JoinHandle<Box<dyn WorkloadRun>>,
}

/// Drives one stress session at a time
pub struct SessionController {
    config: SessionConfig,
    workload: Arc<dyn Workload>,
    thermal_source: Arc<dyn TemperatureSource>,
    formatter: Formatter,
    state: Arc<Mutex<SessionState>>,
    hub: NotificationHub,
    sampler: Option<SamplerHandle>,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        workload: Arc<dyn Workload>,
        thermal_source: Arc<dyn TemperatureSource>,
    ) -> Self {
        SessionController {
            config,
            workload,
            thermal_source,
            formatter: Formatter::default(),
            state: Arc::new(Mutex::new(SessionState::default())),
            hub: NotificationHub::new(),
            sampler: None,
        }
    }

    /// Use custom label text
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Replace the configuration used by the next `start()`
    pub fn set_config(&mut self, config: SessionConfig) {
        self.config = config;
    }

    /// Start a new session from `NotStarted` or `Stopped`.
    ///
    /// Starts the workload, probes the thermal sensor once and launches the
    /// sampling thread. On workload failure the controller is left in a fresh
    /// `NotStarted` state.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.sampler.is_some() {
            return Err(SessionError::AlreadyRunning);
        }

        let request = self.config.workload.clone();
        let run = match self.workload.start(&request) {
            Ok(run) => run,
            Err(e) => {
                log::error!("[Session] ✗ Workload failed to start: {}", e);
                *lock(&self.state) = SessionState::default();
                return Err(e.into());
            }
        };

        let mut thermal = ThermalSampler::new(Arc::clone(&self.thermal_source));
        let thermal_enabled = thermal.try_enable();

        *lock(&self.state) = SessionState::fresh(&self.config, thermal_enabled);

        let sampler = Sampler {
            state: Arc::clone(&self.state),
            hub: self.hub.clone(),
            run,
            thermal,
            metrics: request.tracked_metrics(),
            interval: self.config.sampling_interval,
            warm_up_samples: self.config.warm_up_samples,
        };

        let (stop_tx, stop_rx) = bounded(1);
        let join = thread::Builder::new()
            .name("xops-sampler".to_string())
            .spawn(move || sampler.run(stop_rx))
            .map_err(|e| {
                // The workload run was moved into the closure and is dropped here.
                log::error!("[Session] ✗ Failed to spawn sampler thread: {}", e);
                *lock(&self.state) = SessionState::default();
                SessionError::TimerSpawn(e.to_string())
            })?;

        self.sampler = Some(SamplerHandle { stop_tx, join });

        log::info!(
            "[Session] ✓ Started: metrics={:?} interval={:?} smoothing={} warm_up={} thermal={}",
            request.tracked_metrics(),
            self.config.sampling_interval,
            self.config.smoothing_factor,
            self.config.warm_up_samples,
            thermal_enabled
        );
        Ok(())
    }

    /// Stop the running session and return its final summary.
    ///
    /// Blocks until the in-flight tick (if any) has finished and the sampling
    /// thread has exited; no sample is appended after this returns. Returns
    /// `None` when no session is running.
    pub fn stop(&mut self) -> Option<StatusLabels> {
        let sampler = self.sampler.take()?;

        let _ = sampler.stop_tx.send(());
        match sampler.join.join() {
            Ok(mut run) => run.stop(),
            Err(_) => log::error!("[Session] ✗ Sampler thread panicked; workload dropped"),
        }

        let mut state = lock(&self.state);
        state.frozen_elapsed = Some(state.elapsed());
        state.snapshot.phase = SessionPhase::Stopped;

        let snapshot = state.snapshot();
        let labels = self.formatter.final_labels(&snapshot);
        state.final_labels = Some(labels.clone());

        log::info!(
            "[Session] Stopped after {:.1}s: {} ticks, {} updates, {} missed samples",
            snapshot.elapsed.as_secs_f64(),
            snapshot.tick_count,
            snapshot.update_count,
            snapshot.missed_samples
        );
        Some(labels)
    }

    /// Receiver that fires (coalesced) whenever results change
    pub fn subscribe(&self) -> Receiver<()> {
        self.hub.subscribe()
    }

    pub fn phase(&self) -> SessionPhase {
        lock(&self.state).snapshot.phase
    }

    pub fn is_running(&self) -> bool {
        self.sampler.is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        lock(&self.state).snapshot()
    }

    /// Labels for the current live view
    pub fn live_labels(&self) -> StatusLabels {
        self.formatter.live_labels(&self.snapshot())
    }

    /// Summary computed by the last `stop()`
    pub fn final_labels(&self) -> Option<StatusLabels> {
        lock(&self.state).final_labels.clone()
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if self.sampler.is_some() {
            log::warn!("[Session] Drop: stopping active session");
            self.stop();
        }
    }
}
