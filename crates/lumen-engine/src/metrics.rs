//! Per-step timing and population counters.
//!
//! [`StepMetrics`] holds wall-clock timings and is never part of the
//! deterministic output. [`StepCounters`] holds slot and track counts,
//! which are identical across runs with the same input however the
//! sweeps are scheduled.

use serde::Serialize;

/// Timing metrics collected during a single step.
///
/// All durations are in microseconds. The stepper populates these fields
/// after each `step()` call.
#[derive(Clone, Debug, Default)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step.
    pub total_us: u64,
    /// Time spent initializing tracks from pending initializers.
    pub initialize_us: u64,
    /// Time spent resetting per-step track state.
    pub pre_step_us: u64,
    /// Per-action execution times: `(label, microseconds)`, in run order.
    pub action_us: Vec<(String, u64)>,
    /// Per-model sweep times: `(label, microseconds)`, in model order.
    pub model_us: Vec<(String, u64)>,
    /// Time spent promoting secondaries to initializers.
    pub harvest_us: u64,
    /// Time spent reclaiming slots and clearing the secondary arena.
    pub cleanup_us: u64,
}

/// Population counts for a single step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StepCounters {
    /// Zero-based step index.
    pub step: u64,
    /// Occupied slots after initialization.
    pub active: usize,
    /// Tracks initialized at the start of the step.
    pub initialized: usize,
    /// Alive tracks after cleanup.
    pub alive: usize,
    /// Pending initializers after harvesting secondaries.
    pub pending: usize,
    /// Secondary arena high-water mark for the step.
    pub secondaries: usize,
    /// Secondaries promoted to initializers.
    pub promoted: usize,
    /// Tracks killed during the step.
    pub killed: usize,
    /// Interactions that could not reserve secondary storage.
    pub failed_interactions: usize,
    /// Whether the secondary arena ran out during the step.
    pub arena_exhausted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = StepMetrics::default();
        assert_eq!(m.total_us, 0);
        assert_eq!(m.initialize_us, 0);
        assert!(m.action_us.is_empty());
        assert!(m.model_us.is_empty());
        assert_eq!(m.harvest_us, 0);
        assert_eq!(m.cleanup_us, 0);
    }

    #[test]
    fn counters_serialize_by_field_name() {
        let c = StepCounters {
            step: 2,
            alive: 5,
            arena_exhausted: true,
            ..StepCounters::default()
        };
        let json = serde_json::to_value(c).unwrap();
        assert_eq!(json["step"], 2);
        assert_eq!(json["alive"], 5);
        assert_eq!(json["arena_exhausted"], true);
        assert_eq!(json["failed_interactions"], 0);
    }
}
