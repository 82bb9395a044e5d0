//! Label formatting
//!
//! Turns a [`SessionSnapshot`] into the strings shown next to each metric and
//! the thermal readout. Every call is a pure function of the snapshot; nothing
//! is cached between calls.

use super::controller::{SessionSnapshot, ThermalStatus};
use super::series::TimeSeries;
use crate::error::SeriesError;
use crate::models::{Metric, SessionPhase};
use std::time::Duration;

/// Elapsed time after which the final summary compares 5-sample averages
const LONG_RUN: Duration = Duration::from_secs(10);
/// Smoothed samples required for the averaged final summary
const LONG_RUN_MIN_SAMPLES: usize = 10;
/// Samples averaged at each end of the series in the final summary
const SUMMARY_WINDOW: usize = 5;
/// Percentage change inside which the trend is reported as unchanged
const TREND_DEAD_BAND: f64 = 5.0;

/// User-facing words, English by default
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Labels {
    pub start: String,
    pub now: String,
    pub end: String,
    pub first_5_sec: String,
    pub last_5_sec: String,
    pub threads: String,
    pub warming_up: String,
    pub temp_not_available: String,
    pub cpu: String,
}

impl Default for Labels {
    fn default() -> Self {
        Labels {
            start: "Start".to_string(),
            now: "Now".to_string(),
            end: "End".to_string(),
            first_5_sec: "First 5 sec".to_string(),
            last_5_sec: "Last 5 sec".to_string(),
            threads: "threads".to_string(),
            warming_up: "Warming up".to_string(),
            temp_not_available: "Temperature not available".to_string(),
            cpu: "CPU".to_string(),
        }
    }
}

/// Direction of change between two values
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trend {
    Down,
    Flat,
    Up,
}

impl Trend {
    /// Classify a percentage change; exactly ±5% is still flat
    pub fn from_percent(percent: f64) -> Self {
        if percent < -TREND_DEAD_BAND {
            Trend::Down
        } else if percent > TREND_DEAD_BAND {
            Trend::Up
        } else {
            Trend::Flat
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Trend::Down => "↓",
            Trend::Flat => "⇆",
            Trend::Up => "↑",
        }
    }
}

/// Percentage change from `start` to `end`. A zero start reports 0%.
pub fn percent_change(start: f64, end: f64) -> f64 {
    let percent = (end - start) * 100.0 / start;
    if percent.is_finite() {
        percent
    } else {
        0.0
    }
}

/// Label for one metric
#[derive(Clone, Debug, PartialEq)]
pub struct MetricLabel {
    pub metric: Metric,
    pub text: String,
}

/// All labels for one view of the session
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusLabels {
    pub metrics: Vec<MetricLabel>,
    pub thermal: String,
}

impl StatusLabels {
    pub fn metric(&self, metric: Metric) -> Option<&str> {
        self.metrics
            .iter()
            .find(|l| l.metric == metric)
            .map(|l| l.text.as_str())
    }
}

/// Stateless label formatter
#[derive(Clone, Debug, Default)]
pub struct Formatter {
    labels: Labels,
}

impl Formatter {
    pub fn new(labels: Labels) -> Self {
        Formatter { labels }
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Labels for the live view, refreshed on every notification
    pub fn live_labels(&self, snapshot: &SessionSnapshot) -> StatusLabels {
        match snapshot.phase {
            SessionPhase::NotStarted => StatusLabels::default(),
            SessionPhase::WarmingUp => {
                let metrics = snapshot
                    .series
                    .iter()
                    .map(|s| MetricLabel {
                        metric: s.metric,
                        text: format!(
                            "{} {}\n{}...",
                            s.threads, self.labels.threads, self.labels.warming_up
                        ),
                    })
                    .collect();

                StatusLabels {
                    metrics,
                    thermal: format!("{}...", self.labels.warming_up),
                }
            }
            SessionPhase::Running | SessionPhase::Stopped => {
                let metrics = snapshot
                    .series
                    .iter()
                    .map(|s| MetricLabel {
                        metric: s.metric,
                        text: self
                            .live_metric_text(s.metric, &s.series, snapshot.update_count)
                            .unwrap_or_default(),
                    })
                    .collect();

                StatusLabels {
                    metrics,
                    thermal: self.thermal_label(snapshot),
                }
            }
        }
    }

    /// Summary labels computed when a session stops
    pub fn final_labels(&self, snapshot: &SessionSnapshot) -> StatusLabels {
        let metrics = snapshot
            .series
            .iter()
            .map(|s| MetricLabel {
                metric: s.metric,
                text: self
                    .final_metric_text(s.metric, &s.series, snapshot.elapsed)
                    .unwrap_or_default(),
            })
            .collect();

        StatusLabels {
            metrics,
            thermal: self.thermal_label(snapshot),
        }
    }

    fn live_metric_text(
        &self,
        metric: Metric,
        series: &TimeSeries,
        update_count: u64,
    ) -> Result<String, SeriesError> {
        let start = series.start_smooth()?;
        let current = series.current_smooth()?;
        let unit = metric.unit();

        if update_count < metric.steady_state_after() {
            Ok(format!(
                "{}: {:.2} {}\n{}: {:.2} {}",
                self.labels.start, start, unit, self.labels.now, current, unit
            ))
        } else {
            Ok(format!(
                "{:.2} {}\n{:+.2}%",
                current,
                unit,
                percent_change(start, current)
            ))
        }
    }

    fn final_metric_text(
        &self,
        metric: Metric,
        series: &TimeSeries,
        elapsed: Duration,
    ) -> Result<String, SeriesError> {
        let long_run = elapsed > LONG_RUN && series.len() >= LONG_RUN_MIN_SAMPLES;

        let (first_label, first, last_label, last) = if long_run {
            (
                &self.labels.first_5_sec,
                series.head_average(SUMMARY_WINDOW)?,
                &self.labels.last_5_sec,
                series.tail_average(SUMMARY_WINDOW)?,
            )
        } else {
            (
                &self.labels.start,
                series.start_smooth()?,
                &self.labels.end,
                series.current_smooth()?,
            )
        };

        let percent = percent_change(first, last);
        let unit = metric.unit();

        Ok(format!(
            "{}: {:.2} {}\n{}: {:.2} {}\n{} {:.2}%",
            first_label,
            first,
            unit,
            last_label,
            last,
            unit,
            Trend::from_percent(percent).glyph(),
            percent
        ))
    }

    /// Temperature line followed by a `m:ss` clock whose separator blinks
    /// between `:` and `.` on alternate updates
    fn thermal_label(&self, snapshot: &SessionSnapshot) -> String {
        let reading = match &snapshot.thermal {
            ThermalStatus::Unavailable => self.labels.temp_not_available.clone(),
            ThermalStatus::Available(None) => String::new(),
            ThermalStatus::Available(Some(r)) => {
                let delta = r.delta();
                let glyph = if delta > 0.0 {
                    "↑"
                } else if delta < 0.0 {
                    "↓"
                } else {
                    "⇆"
                };
                format!(
                    "{} {:.1}°C {}{:+.1}°C",
                    self.labels.cpu, r.current, glyph, delta
                )
            }
        };

        let secs = snapshot.elapsed.as_secs();
        let separator = if snapshot.update_count % 2 == 0 { ':' } else { '.' };

        format!("{}\n{}{}{:02}", reading, secs / 60, separator, secs % 60)
    }
}
