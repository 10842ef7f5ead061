//! Read-only observers of track state.
//!
//! A [`Diagnostic`] is invoked on the stepping thread at two fixed points
//! of every step, never concurrently with a sweep:
//!
//! - `mid_step`: after interactions are applied, before secondaries are
//!   harvested. Killed tracks still occupy their slots.
//! - `end_step`: after cleanup. Only surviving tracks occupy slots.
//!
//! Slots are visited in slot order, so every provided sink is
//! deterministic.

use indexmap::IndexMap;
use lumen_action::{CoreParams, InteractionAction};
use lumen_track::{CoreState, StepLimitAction, TrackStatus};

use crate::config::{HistogramInput, RunInput};
use crate::output::Histogram;

/// A read-only observer called at fixed points of each step.
pub trait Diagnostic {
    /// Name for logs.
    fn label(&self) -> &str;

    /// After interactions are applied.
    fn mid_step(&mut self, _params: &CoreParams, _state: &CoreState) {}

    /// After killed slots are reclaimed.
    fn end_step(&mut self, _params: &CoreParams, _state: &CoreState) {}
}

/// Alive track count after each step.
#[derive(Clone, Debug, Default)]
pub struct TrackDiagnostic {
    alive: Vec<usize>,
}

impl TrackDiagnostic {
    /// Alive counts so far, one per step.
    pub fn alive_per_step(&self) -> &[usize] {
        &self.alive
    }
}

impl Diagnostic for TrackDiagnostic {
    fn label(&self) -> &str {
        "track"
    }

    fn end_step(&mut self, _params: &CoreParams, state: &CoreState) {
        self.alive.push(state.num_alive());
    }
}

/// Energy deposited in each step, binned by the track's x position.
#[derive(Clone, Debug)]
pub struct EnergyDiagnostic {
    histogram: Histogram,
}

impl EnergyDiagnostic {
    /// Empty deposition histogram.
    pub fn new(input: &HistogramInput) -> Self {
        Self {
            histogram: Histogram::new(input),
        }
    }

    /// The accumulated histogram.
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }
}

impl Diagnostic for EnergyDiagnostic {
    fn label(&self) -> &str {
        "energy-deposition"
    }

    fn mid_step(&mut self, _params: &CoreParams, state: &CoreState) {
        for track in state.slots() {
            let edep = track.physics.energy_deposition;
            if track.sim.track_id.is_some() && edep > 0.0 {
                self.histogram.fill(track.geo.pos[0], edep);
            }
        }
    }
}

/// Per-particle histogram of step counts at death.
///
/// Bin `i` counts tracks that died after `i` steps; the last bin also
/// collects every longer-lived track.
#[derive(Clone, Debug)]
pub struct StepDiagnostic {
    bins: usize,
    counts: IndexMap<String, Vec<u64>>,
}

impl StepDiagnostic {
    /// Empty histograms with `bins` bins each.
    pub fn new(bins: usize) -> Self {
        Self {
            bins: bins.max(1),
            counts: IndexMap::new(),
        }
    }

    /// Histograms keyed by particle name, in first-death order.
    pub fn counts(&self) -> &IndexMap<String, Vec<u64>> {
        &self.counts
    }
}

impl Diagnostic for StepDiagnostic {
    fn label(&self) -> &str {
        "steps-at-death"
    }

    fn mid_step(&mut self, params: &CoreParams, state: &CoreState) {
        for track in state.slots() {
            if track.sim.track_id.is_none() || track.sim.status != TrackStatus::Killed {
                continue;
            }
            let name = particle_name(params, track.particle.particle);
            let bins = self.bins;
            let hist = self
                .counts
                .entry(name)
                .or_insert_with(|| vec![0; bins]);
            let bin = (track.sim.num_steps as usize).min(bins - 1);
            hist[bin] += 1;
        }
    }
}

/// Discrete interaction counts per particle and model.
///
/// Failed interactions are not counted; they are re-sampled on a later
/// step.
#[derive(Clone, Debug, Default)]
pub struct ProcessDiagnostic {
    counts: IndexMap<String, IndexMap<String, u64>>,
}

impl ProcessDiagnostic {
    /// Counts keyed by particle name then model label.
    pub fn counts(&self) -> &IndexMap<String, IndexMap<String, u64>> {
        &self.counts
    }
}

impl Diagnostic for ProcessDiagnostic {
    fn label(&self) -> &str {
        "process"
    }

    fn mid_step(&mut self, params: &CoreParams, state: &CoreState) {
        for track in state.slots() {
            let Some(outcome) = track.interaction else {
                continue;
            };
            if outcome.action == InteractionAction::Failed {
                continue;
            }
            let Some(StepLimitAction::Interact(model)) = track.sim.step_limit.action else {
                continue;
            };
            let Some(model) = params.physics.model(model) else {
                continue;
            };
            *self
                .counts
                .entry(particle_name(params, track.particle.particle))
                .or_default()
                .entry(model.label().to_string())
                .or_default() += 1;
        }
    }
}

fn particle_name(params: &CoreParams, particle: lumen_core::ParticleId) -> String {
    params
        .particles
        .get(particle)
        .map_or_else(|| particle.to_string(), |d| d.name.clone())
}

/// The standard sinks whose output makes up a
/// [`RunResult`](crate::RunResult).
#[derive(Clone, Debug)]
pub struct DiagnosticSet {
    /// Alive counts.
    pub tracks: TrackDiagnostic,
    /// Energy deposition.
    pub energy: EnergyDiagnostic,
    /// Steps at death.
    pub steps: StepDiagnostic,
    /// Interaction counts.
    pub processes: ProcessDiagnostic,
}

impl DiagnosticSet {
    /// Sinks configured from `input`.
    pub fn new(input: &RunInput) -> Self {
        Self {
            tracks: TrackDiagnostic::default(),
            energy: EnergyDiagnostic::new(&input.energy_histogram),
            steps: StepDiagnostic::new(input.step_histogram_bins),
            processes: ProcessDiagnostic::default(),
        }
    }
}

impl Diagnostic for DiagnosticSet {
    fn label(&self) -> &str {
        "standard"
    }

    fn mid_step(&mut self, params: &CoreParams, state: &CoreState) {
        self.tracks.mid_step(params, state);
        self.energy.mid_step(params, state);
        self.steps.mid_step(params, state);
        self.processes.mid_step(params, state);
    }

    fn end_step(&mut self, params: &CoreParams, state: &CoreState) {
        self.tracks.end_step(params, state);
        self.energy.end_step(params, state);
        self.steps.end_step(params, state);
        self.processes.end_step(params, state);
    }
}

/// Forwards every hook to two diagnostics, `first` then `second`.
pub(crate) struct Chain<'a> {
    pub(crate) first: &'a mut dyn Diagnostic,
    pub(crate) second: &'a mut dyn Diagnostic,
}

impl Diagnostic for Chain<'_> {
    fn label(&self) -> &str {
        self.first.label()
    }

    fn mid_step(&mut self, params: &CoreParams, state: &CoreState) {
        self.first.mid_step(params, state);
        self.second.mid_step(params, state);
    }

    fn end_step(&mut self, params: &CoreParams, state: &CoreState) {
        self.first.end_step(params, state);
        self.second.end_step(params, state);
    }
}
