//! Hardware detection public API module.
//!
//! Static facts about the machine a stress session runs on, plus the
//! sysfs-backed temperature source used by the runner.
//!
//! ## Architecture
//! - **cpu**: `/proc/cpuinfo` parsing for model name and physical core count
//! - **sensor**: hwmon package-temperature reader implementing `TemperatureSource`

pub mod cpu;
pub mod sensor;

pub use cpu::{parse_cpuinfo, read_cpuinfo, CpuInfo};
pub use sensor::HwmonSensor;

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use sysinfo::System;

/// Device properties that do not change while the process runs
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub cpu_model: String,
    /// Logical processors visible to the OS (SMT siblings included)
    pub logical_processors: u32,
    pub physical_cores: u32,
    pub total_memory_bytes: u64,
}

static DEVICE_INFO: OnceLock<DeviceInfo> = OnceLock::new();

impl DeviceInfo {
    /// Detect once per process; later calls reuse the first result.
    ///
    /// Every field degrades gracefully: an unknown model becomes `"Unknown"`,
    /// processor counts never drop below 1 and unreadable memory reports 0.
    pub fn detect() -> &'static DeviceInfo {
        DEVICE_INFO.get_or_init(|| {
            let info = Self::probe();
            log::info!(
                "[Hardware] ✓ {} ({} logical / {} physical, {} MiB RAM)",
                info.cpu_model,
                info.logical_processors,
                info.physical_cores,
                info.total_memory_bytes / (1024 * 1024)
            );
            info
        })
    }

    /// Uncached detection
    pub fn probe() -> DeviceInfo {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();

        let brand = sys.cpus().first().map(|cpu| cpu.brand().to_string());
        Self::from_parts(
            read_cpuinfo(),
            brand,
            num_cpus::get() as u32,
            num_cpus::get_physical() as u32,
            sys.total_memory(),
        )
    }

    /// Combine the individual sources.
    ///
    /// `/proc/cpuinfo` wins for the model and core count; the sysinfo brand and
    /// the `num_cpus` physical count fill in when it is missing. Core count is
    /// clamped to the logical processors the process can use.
    fn from_parts(
        cpuinfo: Option<CpuInfo>,
        brand: Option<String>,
        logical: u32,
        physical_fallback: u32,
        total_memory_bytes: u64,
    ) -> DeviceInfo {
        let logical_processors = logical.max(1);
        let (model, cores) = match cpuinfo {
            Some(info) => (info.model, info.cores),
            None => (None, physical_fallback),
        };

        let cpu_model = model
            .or_else(|| brand.map(|b| b.trim().to_string()))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());

        DeviceInfo {
            cpu_model,
            logical_processors,
            physical_cores: cores.clamp(1, logical_processors),
            total_memory_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_is_cached() {
        let first = DeviceInfo::detect();
        let second = DeviceInfo::detect();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_device_info_is_populated() {
        let info = DeviceInfo::probe();
        assert!(!info.cpu_model.is_empty());
        assert!(info.logical_processors >= 1);
        assert!(info.physical_cores >= 1);
        assert!(info.physical_cores <= info.logical_processors);
    }
    #[test]
    fn test_from_parts_prefers_cpuinfo() {
        let cpuinfo = CpuInfo {
            model: Some("AMD Ryzen 7 5800X 8-Core Processor".to_string()),
            cores: 8,
        };
        let info = DeviceInfo::from_parts(Some(cpuinfo), Some("brand".to_string()), 16, 4, 1024);
        assert_eq!(info.cpu_model, "AMD Ryzen 7 5800X 8-Core Processor");
        assert_eq!(info.logical_processors, 16);
        assert_eq!(info.physical_cores, 8);
        assert_eq!(info.total_memory_bytes, 1024);
    }

    #[test]
    fn test_from_parts_clamps_cores_to_usable_processors() {
        // Affinity can hide processors that /proc/cpuinfo still lists.
        let cpuinfo = CpuInfo {
            model: None,
            cores: 8,
        };
        let brand = Some("  Cortex-A72 ".to_string());
        let info = DeviceInfo::from_parts(Some(cpuinfo), brand, 2, 8, 0);
        assert_eq!(info.cpu_model, "Cortex-A72");
        assert_eq!(info.physical_cores, 2);
    }

    #[test]
    fn test_from_parts_without_cpuinfo() {
        let info = DeviceInfo::from_parts(None, None, 0, 0, 0);
        assert_eq!(info.cpu_model, "Unknown");
        assert_eq!(info.logical_processors, 1);
        assert_eq!(info.physical_cores, 1);

        let info = DeviceInfo::from_parts(None, Some(String::new()), 12, 6, 0);
        assert_eq!(info.cpu_model, "Unknown");
        assert_eq!(info.physical_cores, 6);
    }
}
