//! Thermal Sampler
//!
//! Best-effort temperature tracking layered on top of a stress session.
//! The device capability is probed once when a session starts; if the probe
//! fails the sampler stays disabled for the rest of the session and never
//! touches the sensor again. Individual read failures after a successful
//! probe just mean "no reading this tick".

use crate::error::ThermalError;
use std::sync::Arc;

/// Device capability: instantaneous temperature in degrees Celsius
pub trait TemperatureSource: Send + Sync {
    fn temperature(&self) -> Result<f64, ThermalError>;
}

/// One successful temperature sample relative to the session baseline
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThermalReading {
    /// Temperature at this tick (°C)
    pub current: f64,
    /// First temperature recorded in the session (°C)
    pub baseline: f64,
}

impl ThermalReading {
    /// Signed change from the baseline (°C)
    pub fn delta(&self) -> f64 {
        self.current - self.baseline
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ProbeState {
    Unprobed,
    Supported,
    Unsupported,
}

/// Per-session wrapper around a [`TemperatureSource`]
pub struct ThermalSampler {
    source: Arc<dyn TemperatureSource>,
    probe: ProbeState,
    history: Vec<f64>,
}

impl ThermalSampler {
    pub fn new(source: Arc<dyn TemperatureSource>) -> Self {
        ThermalSampler {
            source,
            probe: ProbeState::Unprobed,
            history: Vec::new(),
        }
    }

    /// Probe the sensor once. Returns whether thermal tracking is enabled.
    ///
    /// Once a probe has failed the sampler is permanently disabled and this
    /// call no longer reads the sensor.
    pub fn try_enable(&mut self) -> bool {
        match self.probe {
            ProbeState::Supported => true,
            ProbeState::Unsupported => false,
            ProbeState::Unprobed => match self.source.temperature() {
                Ok(t) => {
                    log::info!("[Thermal] ✓ Sensor available ({:.1}°C)", t);
                    self.probe = ProbeState::Supported;
                    true
                }
                Err(e) => {
                    log::info!("[Thermal] Sensor disabled for this session: {}", e);
                    self.probe = ProbeState::Unsupported;
                    false
                }
            },
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.probe == ProbeState::Supported
    }

    /// Take a fresh reading, or `None` if disabled or the read failed
    pub fn sample(&mut self) -> Option<ThermalReading> {
        if !self.is_enabled() {
            return None;
        }

        match self.source.temperature() {
            Ok(current) => {
                self.history.push(current);
                Some(ThermalReading {
                    current,
                    baseline: self.history[0],
                })
            }
            Err(e) => {
                log::debug!("[Thermal] No reading this tick: {}", e);
                None
            }
        }
    }

    /// Most recent successful reading
    pub fn latest(&self) -> Option<ThermalReading> {
        match (self.history.first(), self.history.last()) {
            (Some(&baseline), Some(&current)) => Some(ThermalReading { current, baseline }),
            _ => None,
        }
    }

    /// All successful readings this session, oldest first
    pub fn history(&self) -> &[f64] {
        &self.history
    }
}
