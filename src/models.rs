//! Core data types for xOPS Stress.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A throughput metric tracked by a stress session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// Billions of floating-point operations per second
    Gflops,
    /// Billions of integer operations per second
    Ginops,
}

impl Metric {
    /// All metrics in display order
    pub const ALL: [Metric; 2] = [Metric::Gflops, Metric::Ginops];

    /// Unit suffix used in labels
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Gflops => "GFLOPS",
            Metric::Ginops => "GINOPS",
        }
    }

    /// Number of surfaced updates after which the live label switches from
    /// "start vs now" to "now vs percentage change".
    ///
    /// The integer kernel settles later than the float kernel, so its
    /// threshold is higher.
    pub fn steady_state_after(&self) -> u64 {
        match self {
            Metric::Gflops => 10,
            Metric::Ginops => 14,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.unit())
    }
}

/// Lifecycle phase of a stress session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No session has been started (or the last start failed)
    #[default]
    NotStarted,
    /// Samples are recorded but not surfaced
    WarmingUp,
    /// Samples are recorded and surfaced
    Running,
    /// Timer halted, final summary available
    Stopped,
}

impl SessionPhase {
    /// True while the sampling timer is active
    pub fn is_active(&self) -> bool {
        matches!(self, SessionPhase::WarmingUp | SessionPhase::Running)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::NotStarted => write!(f, "Not Started"),
            SessionPhase::WarmingUp => write!(f, "Warming Up"),
            SessionPhase::Running => write!(f, "Running"),
            SessionPhase::Stopped => write!(f, "Stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_units() {
        assert_eq!(Metric::Gflops.unit(), "GFLOPS");
        assert_eq!(Metric::Ginops.to_string(), "GINOPS");
    }

    #[test]
    fn test_metric_thresholds_differ() {
        assert!(Metric::Ginops.steady_state_after() > Metric::Gflops.steady_state_after());
    }

    #[test]
    fn test_phase_activity() {
        assert!(!SessionPhase::NotStarted.is_active());
        assert!(SessionPhase::WarmingUp.is_active());
        assert!(SessionPhase::Running.is_active());
        assert!(!SessionPhase::Stopped.is_active());
        assert_eq!(SessionPhase::default(), SessionPhase::NotStarted);
    }
}
