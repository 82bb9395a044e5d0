//! Thread Count Options
//!
//! Selectable parallelism levels for the float and integer workloads. The
//! recommended level is derived from the logical processor count once, at
//! construction, and is always present in the option list.

/// Fixed base list of selectable thread counts, ascending
pub const BASE_THREAD_OPTIONS: [u32; 8] = [2, 8, 16, 32, 48, 64, 128, 256];

/// Sorted, duplicate-free set of selectable thread counts
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadOptionSet {
    options: Vec<u32>,
    recommended: u32,
}

impl ThreadOptionSet {
    /// Build the option set for a machine with `logical_processors` CPUs
    pub fn new(logical_processors: usize) -> Self {
        let processors = u32::try_from(logical_processors).unwrap_or(u32::MAX / 2);
        let recommended = processors.max(2).saturating_mul(2);

        let mut options = BASE_THREAD_OPTIONS.to_vec();
        match options.iter().position(|&v| v >= recommended) {
            Some(i) if options[i] == recommended => {}
            Some(i) => options.insert(i, recommended),
            None => options.push(recommended),
        }

        log::debug!(
            "[Threads] {} logical processors, recommended={} options={:?}",
            logical_processors,
            recommended,
            options
        );

        ThreadOptionSet { options, recommended }
    }

    /// Build the option set for the current machine
    pub fn detect() -> Self {
        Self::new(num_cpus::get())
    }

    /// Default thread count for this hardware
    pub fn recommended(&self) -> u32 {
        self.recommended
    }

    /// Return `candidate` if it is a known option, otherwise the recommended count.
    ///
    /// Persisted selections may come from a machine with a different processor
    /// count or from a build with a different option list.
    pub fn validate(&self, candidate: u32) -> u32 {
        if self.contains(candidate) {
            candidate
        } else {
            log::info!(
                "[Threads] Stored thread count {} is not selectable here, using {}",
                candidate,
                self.recommended
            );
            self.recommended
        }
    }

    /// Next option after `current`, wrapping around to the smallest.
    /// An unknown `current` yields the smallest option.
    pub fn next_after(&self, current: u32) -> u32 {
        let next = self
            .options
            .iter()
            .position(|&v| v == current)
            .map(|i| i + 1)
            .unwrap_or(0);

        self.options.get(next).copied().unwrap_or(self.options[0])
    }

    pub fn contains(&self, value: u32) -> bool {
        self.options.binary_search(&value).is_ok()
    }

    pub fn options(&self) -> &[u32] {
        &self.options
    }
}

impl Default for ThreadOptionSet {
    fn default() -> Self {
        Self::detect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommended_already_present() {
        let set = ThreadOptionSet::new(8);
        assert_eq!(set.recommended(), 16);
        assert_eq!(set.options(), &BASE_THREAD_OPTIONS);
    }

    #[test]
    fn test_recommended_inserted_in_order() {
        let set = ThreadOptionSet::new(20);
        assert_eq!(set.recommended(), 40);
        assert_eq!(set.options(), &[2, 8, 16, 32, 40, 48, 64, 128, 256]);
    }

    #[test]
    fn test_single_processor_uses_floor_of_two() {
        let set = ThreadOptionSet::new(1);
        assert_eq!(set.recommended(), 4);
        assert_eq!(set.options(), &[2, 4, 8, 16, 32, 48, 64, 128, 256]);
    }

    #[test]
    fn test_zero_processors() {
        let set = ThreadOptionSet::new(0);
        assert_eq!(set.recommended(), 4);
    }

    #[test]
    fn test_recommended_appended_at_tail() {
        let set = ThreadOptionSet::new(192);
        assert_eq!(set.recommended(), 384);
        assert_eq!(set.options().last(), Some(&384));
        assert_eq!(set.options().len(), BASE_THREAD_OPTIONS.len() + 1);
    }

    #[test]
    fn test_validate() {
        let set = ThreadOptionSet::new(20);
        for &v in set.options() {
            assert_eq!(set.validate(v), v);
        }
        assert_eq!(set.validate(0), 40);
        assert_eq!(set.validate(12), 40);
        assert_eq!(set.validate(1024), 40);
    }

    #[test]
    fn test_next_after_wraps() {
        let set = ThreadOptionSet::new(8);
        assert_eq!(set.next_after(2), 8);
        assert_eq!(set.next_after(128), 256);
        assert_eq!(set.next_after(256), 2);
        assert_eq!(set.next_after(5), 2);
    }

    #[test]
    fn test_detect_contains_recommended() {
        let set = ThreadOptionSet::detect();
        assert!(set.contains(set.recommended()));
        assert!(set.options().windows(2).all(|w| w[0] < w[1]));
    }
}
