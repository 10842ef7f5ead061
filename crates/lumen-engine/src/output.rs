//! Aggregated run output and its JSON writer.

use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::HistogramInput;
use crate::hash::Fingerprint;
use crate::metrics::{StepCounters, StepMetrics};

// ── OutputError ────────────────────────────────────────────────────

/// Errors writing run output. In-memory results are left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputError {
    /// The output file could not be created or written.
    Io {
        /// The offending path.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, reason } => {
                write!(f, "cannot write '{}': {reason}", path.display())
            }
        }
    }
}

impl Error for OutputError {}

// ── Histogram ──────────────────────────────────────────────────────

/// Weighted histogram with uniform bins and out-of-range tallies.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Histogram {
    /// `bins + 1` bin edges from `lower` to `upper`.
    pub edges: Vec<f64>,
    /// Accumulated weight per bin.
    pub values: Vec<f64>,
    /// Weight below the first edge.
    pub underflow: f64,
    /// Weight at or above the last edge, and NaN positions.
    pub overflow: f64,
}

impl Histogram {
    /// Empty histogram with `linspace(lower, upper, bins + 1)` edges.
    pub fn new(input: &HistogramInput) -> Self {
        let bins = input.bins.max(1);
        let width = input.upper - input.lower;
        let mut edges: Vec<f64> = (0..=bins)
            .map(|i| input.lower + width * i as f64 / bins as f64)
            .collect();
        edges[bins] = input.upper;
        Self {
            edges,
            values: vec![0.0; bins],
            underflow: 0.0,
            overflow: 0.0,
        }
    }

    /// Number of bins.
    pub fn num_bins(&self) -> usize {
        self.values.len()
    }

    /// Bin containing `x`, or `None` if it is out of range.
    pub fn bin(&self, x: f64) -> Option<usize> {
        let lower = self.edges[0];
        let upper = self.edges[self.num_bins()];
        if !(lower..upper).contains(&x) {
            return None;
        }
        let bins = self.num_bins();
        let mut i = (((x - lower) / (upper - lower)) * bins as f64) as usize;
        i = i.min(bins - 1);
        // Correct for rounding at the edges.
        if x < self.edges[i] {
            i -= 1;
        } else if x >= self.edges[i + 1] {
            i += 1;
        }
        Some(i)
    }

    /// Add `weight` at `x`.
    pub fn fill(&mut self, x: f64, weight: f64) {
        match self.bin(x) {
            Some(i) => self.values[i] += weight,
            None if x < self.edges[0] => self.underflow += weight,
            None => self.overflow += weight,
        }
    }

    /// Sum of all weight, including out-of-range tallies.
    pub fn total(&self) -> f64 {
        self.values.iter().sum::<f64>() + self.underflow + self.overflow
    }

    fn fingerprint(&self, hash: Fingerprint) -> Fingerprint {
        hash.f64s(&self.edges)
            .f64s(&self.values)
            .f64(self.underflow)
            .f64(self.overflow)
    }
}

// ── Termination ────────────────────────────────────────────────────

/// Why the step loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Termination {
    /// No alive tracks and no pending initializers.
    Drained,
    /// The step budget ran out. Remaining tracks were not killed.
    StepBudgetExhausted {
        /// Tracks still in flight.
        alive: usize,
        /// Initializers never started.
        pending: usize,
    },
}

// ── TimingTotals ───────────────────────────────────────────────────

/// Wall-clock totals over a run, in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TimingTotals {
    /// Sum of step times.
    pub total_us: u64,
    /// Track initialization.
    pub initialize_us: u64,
    /// Start-of-step reset.
    pub pre_step_us: u64,
    /// Per action label.
    pub actions: IndexMap<String, u64>,
    /// Per model label.
    pub models: IndexMap<String, u64>,
    /// Secondary harvesting.
    pub harvest_us: u64,
    /// Slot reclamation and arena reset.
    pub cleanup_us: u64,
}

impl TimingTotals {
    /// Accumulate one step's metrics.
    pub fn add(&mut self, m: &StepMetrics) {
        self.total_us += m.total_us;
        self.initialize_us += m.initialize_us;
        self.pre_step_us += m.pre_step_us;
        for (label, us) in &m.action_us {
            *self.actions.entry(label.clone()).or_default() += us;
        }
        for (label, us) in &m.model_us {
            *self.models.entry(label.clone()).or_default() += us;
        }
        self.harvest_us += m.harvest_us;
        self.cleanup_us += m.cleanup_us;
    }
}

// ── RunResult ──────────────────────────────────────────────────────

/// Everything a finished run reports.
///
/// All fields except `timing` are deterministic: they depend only on the
/// run input, never on thread count or scheduling, provided the secondary
/// arena never ran out.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunResult {
    /// Why the loop stopped.
    pub termination: Termination,
    /// Steps executed.
    pub steps: u64,
    /// Primaries loaded.
    pub primaries: usize,
    /// Alive tracks after each step.
    pub alive_per_step: Vec<usize>,
    /// Energy deposition (MeV) along x.
    pub energy_deposition: Histogram,
    /// Per particle: step counts of tracks at death.
    pub steps_at_death: IndexMap<String, Vec<u64>>,
    /// Per particle, per model: discrete interactions.
    pub interactions: IndexMap<String, IndexMap<String, u64>>,
    /// Per-step counters.
    pub counters: Vec<StepCounters>,
    /// Wall-clock totals.
    pub timing: TimingTotals,
}

impl RunResult {
    /// FNV-1a hash over every deterministic field.
    pub fn fingerprint(&self) -> u64 {
        let mut hash = match self.termination {
            Termination::Drained => Fingerprint::new().u64(0),
            Termination::StepBudgetExhausted { alive, pending } => {
                Fingerprint::new().u64(1).usize(alive).usize(pending)
            }
        };
        hash = hash.u64(self.steps).usize(self.primaries);
        hash = self
            .alive_per_step
            .iter()
            .fold(hash.usize(self.alive_per_step.len()), |h, &n| h.usize(n));
        hash = self.energy_deposition.fingerprint(hash);
        hash = hash.usize(self.steps_at_death.len());
        for (particle, counts) in &self.steps_at_death {
            hash = hash.str(particle).u64s(counts);
        }
        hash = hash.usize(self.interactions.len());
        for (particle, models) in &self.interactions {
            hash = hash.str(particle).usize(models.len());
            for (model, &count) in models {
                hash = hash.str(model).u64(count);
            }
        }
        hash = hash.usize(self.counters.len());
        for c in &self.counters {
            hash = hash
                .u64(c.step)
                .usize(c.active)
                .usize(c.initialized)
                .usize(c.alive)
                .usize(c.pending)
                .usize(c.secondaries)
                .usize(c.promoted)
                .usize(c.killed)
                .usize(c.failed_interactions)
                .u64(c.arena_exhausted as u64);
        }
        hash.finish()
    }

    /// Total deposited energy, including out-of-range tallies.
    pub fn total_energy_deposition(&self) -> f64 {
        self.energy_deposition.total()
    }

    /// Write as pretty-printed JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), OutputError> {
        let path = path.as_ref();
        let io = |reason: String| OutputError::Io {
            path: path.to_path_buf(),
            reason,
        };
        let file = File::create(path).map_err(|e| io(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| io(e.to_string()))?;
        writer.flush().map_err(|e| io(e.to_string()))
    }
}
