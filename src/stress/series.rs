//! Throughput Time Series
//!
//! Append-only buffer of raw throughput samples plus a derived smoothed
//! series. Every raw sample produces exactly one smoothed value: the mean of
//! the most recent `smoothing_factor` raw samples, or of all samples while
//! fewer than that exist.

use crate::error::SeriesError;

/// Raw and smoothed samples for one tracked metric
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSeries {
    raw: Vec<f64>,
    smoothed: Vec<f64>,
    smoothing_factor: usize,
}

impl TimeSeries {
    /// Create an empty series. A smoothing factor of 0 behaves like 1.
    pub fn new(smoothing_factor: usize) -> Self {
        TimeSeries {
            raw: Vec::new(),
            smoothed: Vec::new(),
            smoothing_factor: smoothing_factor.max(1),
        }
    }

    /// Record a raw sample and derive its smoothed value
    pub fn append(&mut self, value: f64) {
        self.raw.push(value);

        let window = self.raw.len().min(self.smoothing_factor);
        let tail = &self.raw[self.raw.len() - window..];
        let mean = tail.iter().sum::<f64>() / window as f64;
        self.smoothed.push(mean);
    }

    /// First smoothed value of the session
    pub fn start_smooth(&self) -> Result<f64, SeriesError> {
        self.smoothed.first().copied().ok_or(SeriesError::EmptySeries)
    }

    /// Most recent smoothed value
    pub fn current_smooth(&self) -> Result<f64, SeriesError> {
        self.smoothed.last().copied().ok_or(SeriesError::EmptySeries)
    }

    /// Mean of `smoothed[skip .. skip + take]`
    pub fn average(&self, skip: usize, take: usize) -> Result<f64, SeriesError> {
        let len = self.smoothed.len();
        let end = skip.checked_add(take);

        match end {
            Some(end) if take > 0 && end <= len => {
                let window = &self.smoothed[skip..end];
                Ok(window.iter().sum::<f64>() / take as f64)
            }
            _ => Err(SeriesError::RangeOutOfBounds { skip, take, len }),
        }
    }

    /// Mean of the first `n` smoothed values
    pub fn head_average(&self, n: usize) -> Result<f64, SeriesError> {
        self.average(0, n)
    }

    /// Mean of the last `n` smoothed values
    pub fn tail_average(&self, n: usize) -> Result<f64, SeriesError> {
        let len = self.smoothed.len();
        if n > len {
            return Err(SeriesError::RangeOutOfBounds { skip: 0, take: n, len });
        }
        self.average(len - n, n)
    }

    /// Number of smoothed values (equal to the number of raw samples)
    pub fn len(&self) -> usize {
        self.smoothed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.smoothed.is_empty()
    }

    pub fn raw(&self) -> &[f64] {
        &self.raw
    }

    pub fn smoothed(&self) -> &[f64] {
        &self.smoothed
    }

    pub fn smoothing_factor(&self) -> usize {
        self.smoothing_factor
    }
}
