//! Benchmark settings management.
//!
//! User preferences (thread counts and precision per workload) survive
//! between runs through a [`SettingsStore`]. Stored thread counts are never
//! trusted: they are re-validated against the current machine's
//! [`ThreadOptionSet`] on load, so settings copied from a bigger box fall back
//! to the recommended value instead of producing an unselectable option.
//!
//! # Settings Flow
//!
//! 1. `ThreadOptionSet::detect()` builds the selectable thread counts
//! 2. `BenchSettings::load()` reads each key, repairing stale values
//! 3. Setters and `cycle_*` mutate in memory
//! 4. `BenchSettings::save()` writes every key back
//! 5. `to_request()` hands the selection to a session

pub mod store;

pub use store::{JsonFileStore, MemoryStore, SettingsStore};

use crate::error::ConfigError;
use crate::stress::{ThreadOptionSet, WorkloadRequest};
use serde_json::Value;

pub const KEY_FLOAT_THREADS: &str = "FloatThreads";
pub const KEY_INT_THREADS: &str = "IntThreads";
pub const KEY_FLOAT_64BIT: &str = "Float64Bit";
pub const KEY_INT_64BIT: &str = "Int64Bit";

/// Persisted benchmark preferences
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BenchSettings {
    pub float_threads: u32,
    pub int_threads: u32,
    pub float_64bit: bool,
    pub int_64bit: bool,
    options: ThreadOptionSet,
}

impl BenchSettings {
    /// Defaults for this machine: recommended threads, 32-bit precision
    pub fn defaults(options: ThreadOptionSet) -> Self {
        BenchSettings {
            float_threads: options.recommended(),
            int_threads: options.recommended(),
            float_64bit: false,
            int_64bit: false,
            options,
        }
    }

    /// Read settings from `store`.
    ///
    /// Absent or mistyped keys fall back to defaults; thread counts that are
    /// not in `options` are replaced by the recommended count.
    pub fn load(store: &dyn SettingsStore, options: ThreadOptionSet) -> Self {
        let read_threads = |key: &str| match store.get(key) {
            Some(value) => match value.as_u64().and_then(|v| u32::try_from(v).ok()) {
                Some(threads) => options.validate(threads),
                None => {
                    log::warn!("[Config] Ignoring non-numeric {}: {}", key, value);
                    options.recommended()
                }
            },
            None => options.recommended(),
        };
        let read_flag = |key: &str| store.get(key).and_then(|v| v.as_bool()).unwrap_or(false);

        BenchSettings {
            float_threads: read_threads(KEY_FLOAT_THREADS),
            int_threads: read_threads(KEY_INT_THREADS),
            float_64bit: read_flag(KEY_FLOAT_64BIT),
            int_64bit: read_flag(KEY_INT_64BIT),
            options,
        }
    }

    /// Write every key to `store`
    pub fn save(&self, store: &dyn SettingsStore) -> Result<(), ConfigError> {
        store.set(KEY_FLOAT_THREADS, Value::from(self.float_threads))?;
        store.set(KEY_INT_THREADS, Value::from(self.int_threads))?;
        store.set(KEY_FLOAT_64BIT, Value::from(self.float_64bit))?;
        store.set(KEY_INT_64BIT, Value::from(self.int_64bit))?;
        log::debug!("[Config] ✓ Settings saved");
        Ok(())
    }

    pub fn options(&self) -> &ThreadOptionSet {
        &self.options
    }

    pub fn set_float_threads(&mut self, threads: u32) {
        self.float_threads = self.options.validate(threads);
    }

    pub fn set_int_threads(&mut self, threads: u32) {
        self.int_threads = self.options.validate(threads);
    }

    /// Advance to the next thread option, wrapping to the first
    pub fn cycle_float_threads(&mut self) -> u32 {
        self.float_threads = self.options.next_after(self.float_threads);
        self.float_threads
    }

    pub fn cycle_int_threads(&mut self) -> u32 {
        self.int_threads = self.options.next_after(self.int_threads);
        self.int_threads
    }

    pub fn toggle_float_precision(&mut self) {
        self.float_64bit = !self.float_64bit;
    }

    pub fn toggle_int_precision(&mut self) {
        self.int_64bit = !self.int_64bit;
    }

    /// Two-line precision badge, e.g. `"64\nBit"`
    pub fn precision_label(is_64bit: bool) -> &'static str {
        if is_64bit {
            "64\nBit"
        } else {
            "32\nBit"
        }
    }

    /// Workload parameters with both kernels enabled
    pub fn to_request(&self) -> WorkloadRequest {
        WorkloadRequest {
            float_threads: self.float_threads,
            int_threads: self.int_threads,
            float_enabled: true,
            int_enabled: true,
            float_64bit: self.float_64bit,
            int_64bit: self.int_64bit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options() -> ThreadOptionSet {
        // 8 logical processors -> recommended 16
        ThreadOptionSet::new(8)
    }

    #[test]
    fn test_empty_store_yields_defaults() {
        let settings = BenchSettings::load(&MemoryStore::new(), options());
        assert_eq!(settings, BenchSettings::defaults(options()));
        assert_eq!(settings.float_threads, 16);
        assert!(!settings.int_64bit);
    }

    #[test]
    fn test_stale_thread_count_is_repaired() {
        let store = MemoryStore::new();
        store.set(KEY_FLOAT_THREADS, json!(40)).unwrap();
        store.set(KEY_INT_THREADS, json!(64)).unwrap();

        let settings = BenchSettings::load(&store, options());
        assert_eq!(settings.float_threads, 16);
        assert_eq!(settings.int_threads, 64);
    }

    #[test]
    fn test_mistyped_values_fall_back() {
        let store = MemoryStore::new();
        store.set(KEY_FLOAT_THREADS, json!("lots")).unwrap();
        store.set(KEY_FLOAT_64BIT, json!(1)).unwrap();

        let settings = BenchSettings::load(&store, options());
        assert_eq!(settings.float_threads, 16);
        assert!(!settings.float_64bit);
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        let mut settings = BenchSettings::defaults(options());
        settings.set_int_threads(128);
        settings.toggle_float_precision();
        settings.save(&store).unwrap();

        let loaded = BenchSettings::load(&store, options());
        assert_eq!(loaded.int_threads, 128);
        assert!(loaded.float_64bit);
    }

    #[test]
    fn test_setter_rejects_unknown_option() {
        let mut settings = BenchSettings::defaults(options());
        settings.set_float_threads(3);
        assert_eq!(settings.float_threads, 16);
    }

    #[test]
    fn test_cycle_wraps_around() {
        let mut settings = BenchSettings::defaults(options());
        settings.set_int_threads(256);
        assert_eq!(settings.cycle_int_threads(), 2);
        assert_eq!(settings.cycle_int_threads(), 8);
    }

    #[test]
    fn test_precision_label() {
        assert_eq!(BenchSettings::precision_label(true), "64\nBit");
        assert_eq!(BenchSettings::precision_label(false), "32\nBit");
    }

    #[test]
    fn test_to_request_enables_both_workloads() {
        let mut settings = BenchSettings::defaults(options());
        settings.toggle_int_precision();
        let request = settings.to_request();
        assert!(request.float_enabled && request.int_enabled);
        assert!(request.int_64bit);
        assert_eq!(request.float_threads, 16);
    }
}
