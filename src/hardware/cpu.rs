//! CPU detection and identification module.

use std::collections::HashSet;
use std::fs;

/// Fields of interest from `/proc/cpuinfo`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CpuInfo {
    pub model: Option<String>,
    /// Physical cores, SMT siblings counted once
    pub cores: u32,
}

/// Parse the text of `/proc/cpuinfo`.
///
/// Core count is the number of distinct `(physical id, core id)` pairs; when
/// the kernel does not expose core ids it falls back to the processor count.
pub fn parse_cpuinfo(content: &str) -> CpuInfo {
    let mut model = None;
    let mut cores = HashSet::new();
    let mut processors = 0u32;
    let mut physical_id = 0u32;

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim() {
            "processor" => processors += 1,
            "model name" | "Processor" | "cpu model" if model.is_none() && !value.is_empty() => {
                model = Some(value.to_string());
            }
            "physical id" => physical_id = value.parse().unwrap_or(0),
            "core id" => {
                if let Ok(core_id) = value.parse::<u32>() {
                    cores.insert((physical_id, core_id));
                }
            }
            _ => {}
        }
    }

    let threads = processors.max(1);
    let cores = if cores.is_empty() {
        threads
    } else {
        (cores.len() as u32).min(threads)
    };

    CpuInfo { model, cores }
}

/// Parsed `/proc/cpuinfo`, if readable
pub fn read_cpuinfo() -> Option<CpuInfo> {
    match fs::read_to_string("/proc/cpuinfo") {
        Ok(content) => Some(parse_cpuinfo(&content)),
        Err(e) => {
            log::debug!("[Hardware] /proc/cpuinfo unavailable: {}", e);
            None
        }
    }
}
