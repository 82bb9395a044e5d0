//! CPU package temperature from Linux hwmon
//!
//! Scans `/sys/class/hwmon` once at construction and then re-reads a single
//! `temp*_input` file (millidegrees Celsius) on every call.
//!
//! Driver preference:
//! - Intel `coretemp` (the input labelled "Package", else `temp1`)
//! - AMD `k10temp` / `zenpower` (`temp1`, Tctl)
//! - any other hwmon device exposing `temp1_input`

use crate::error::ThermalError;
use crate::stress::TemperatureSource;
use std::fs;
use std::path::{Path, PathBuf};

const HWMON_ROOT: &str = "/sys/class/hwmon";

/// Readings outside this range are treated as sensor glitches
const PLAUSIBLE_CELSIUS: std::ops::RangeInclusive<f64> = 0.0..=150.0;

/// Temperature source backed by one hwmon input file
#[derive(Clone, Debug)]
pub struct HwmonSensor {
    input: Option<PathBuf>,
}

impl HwmonSensor {
    /// Locate the best CPU sensor under `/sys/class/hwmon`
    pub fn discover() -> Self {
        Self::discover_in(Path::new(HWMON_ROOT))
    }

    /// Locate the best CPU sensor under an arbitrary hwmon-style root
    pub fn discover_in(root: &Path) -> Self {
        let input = find_cpu_input(root);
        match &input {
            Some(path) => log::info!("[Thermal] Using sensor {}", path.display()),
            None => log::info!("[Thermal] No CPU temperature sensor under {}", root.display()),
        }
        HwmonSensor { input }
    }

    /// Read a specific `temp*_input` file
    pub fn at(input: impl Into<PathBuf>) -> Self {
        HwmonSensor {
            input: Some(input.into()),
        }
    }

    pub fn input_path(&self) -> Option<&Path> {
        self.input.as_deref()
    }
}

impl TemperatureSource for HwmonSensor {
    fn temperature(&self) -> Result<f64, ThermalError> {
        let path = self.input.as_ref().ok_or(ThermalError::Unsupported)?;

        let content = fs::read_to_string(path)
            .map_err(|e| ThermalError::ReadFailed(format!("{}: {}", path.display(), e)))?;
        let raw = content.trim();
        let millidegrees: f64 = raw.parse().map_err(|_| {
            ThermalError::ReadFailed(format!("{}: not a number: {:?}", path.display(), raw))
        })?;

        let celsius = millidegrees / 1000.0;
        if !PLAUSIBLE_CELSIUS.contains(&celsius) {
            return Err(ThermalError::ReadFailed(format!("implausible reading {:.1}°C", celsius)));
        }
        Ok(celsius)
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

fn find_cpu_input(root: &Path) -> Option<PathBuf> {
    let mut devices: Vec<(String, PathBuf)> = fs::read_dir(root)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .filter_map(|path| read_trimmed(&path.join("name")).map(|name| (name, path)))
        .collect();
    // hwmonN numbering is not stable across boots; sort for deterministic picks
    devices.sort_by(|a, b| a.1.cmp(&b.1));

    let by_name = |wanted: &[&str]| {
        devices
            .iter()
            .find(|(name, _)| wanted.contains(&name.as_str()))
            .map(|(_, path)| path.clone())
    };

    if let Some(dir) = by_name(&["coretemp"]) {
        if let Some(input) = coretemp_package_input(&dir) {
            return Some(input);
        }
    }

    if let Some(dir) = by_name(&["k10temp", "zenpower"]) {
        let input = dir.join("temp1_input");
        if input.exists() {
            return Some(input);
        }
    }

    devices
        .iter()
        .map(|(_, dir)| dir.join("temp1_input"))
        .find(|input| input.exists())
}

fn coretemp_package_input(dir: &Path) -> Option<PathBuf> {
    for idx in 1..=64 {
        let label = read_trimmed(&dir.join(format!("temp{}_label", idx)));
        if label.as_deref().is_some_and(|l| l.contains("Package") || l.contains("Die")) {
            let input = dir.join(format!("temp{}_input", idx));
            if input.exists() {
                return Some(input);
            }
        }
    }

    let fallback = dir.join("temp1_input");
    fallback.exists().then_some(fallback)
}
