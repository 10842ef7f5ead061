//! The outer step loop.
//!
//! [`Transporter`] loads primaries, then steps until no track is alive
//! and no initializer is pending, or until the step budget runs out.
//! Running out of budget is a normal termination: the remaining tracks
//! are reported, not killed.

use std::error::Error;
use std::fmt;

use lumen_core::{InitError, Primary, StepError};

use crate::config::{ConfigError, RunConfig};
use crate::diagnostic::{Chain, Diagnostic, DiagnosticSet};
use crate::metrics::StepCounters;
use crate::output::{RunResult, Termination, TimingTotals};
use crate::step::Stepper;

// Compile-time assertion: a Transporter can be moved to a worker thread.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Transporter>();
    }
};

// ── RunError ───────────────────────────────────────────────────────

/// Errors that end a run early.
#[derive(Debug, PartialEq)]
pub enum RunError {
    /// The configuration was rejected before any step.
    Config(ConfigError),
    /// The primaries do not fit in the initializer buffer.
    Init(InitError),
    /// A step failed; no further steps were run.
    Step(StepError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::Init(e) => write!(f, "primaries: {e}"),
            Self::Step(e) => write!(f, "step: {e}"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Init(e) => Some(e),
            Self::Step(e) => Some(e),
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<InitError> for RunError {
    fn from(e: InitError) -> Self {
        Self::Init(e)
    }
}

impl From<StepError> for RunError {
    fn from(e: StepError) -> Self {
        Self::Step(e)
    }
}

// ── Transporter ────────────────────────────────────────────────────

/// Runs a batch of primaries to completion.
#[derive(Debug)]
pub struct Transporter {
    stepper: Stepper,
    diagnostics: DiagnosticSet,
}

impl Transporter {
    /// Validate `config` and allocate track state.
    pub fn new(config: RunConfig) -> Result<Self, ConfigError> {
        let diagnostics = DiagnosticSet::new(&config.input);
        let stepper = Stepper::new(config)?;
        Ok(Self {
            stepper,
            diagnostics,
        })
    }

    /// The underlying stepper.
    pub fn stepper(&self) -> &Stepper {
        &self.stepper
    }

    /// Transport `primaries` until drained or out of budget.
    pub fn run(self, primaries: &[Primary]) -> Result<RunResult, RunError> {
        self.run_inner(primaries, None)
    }

    /// As [`run`](Self::run), also feeding `observer` at every step.
    pub fn run_with(
        self,
        primaries: &[Primary],
        observer: &mut dyn Diagnostic,
    ) -> Result<RunResult, RunError> {
        self.run_inner(primaries, Some(observer))
    }

    fn run_inner(
        mut self,
        primaries: &[Primary],
        mut observer: Option<&mut dyn Diagnostic>,
    ) -> Result<RunResult, RunError> {
        self.stepper.load_primaries(primaries)?;

        let mut counters: Vec<StepCounters> = Vec::new();
        let mut timing = TimingTotals::default();
        let termination = loop {
            let state = self.stepper.state();
            let alive = state.num_alive();
            let pending = state.num_initializers();
            if alive == 0 && pending == 0 {
                break Termination::Drained;
            }
            if self.stepper.steps() >= self.stepper.max_steps() {
                break Termination::StepBudgetExhausted { alive, pending };
            }
            let result = match observer.as_deref_mut() {
                Some(observer) => self.stepper.step(&mut Chain {
                    first: &mut self.diagnostics,
                    second: observer,
                })?,
                None => self.stepper.step(&mut self.diagnostics)?,
            };
            counters.push(result.counters);
            timing.add(&result.metrics);
        };

        if let Termination::StepBudgetExhausted { alive, pending } = termination {
            eprintln!(
                "lumen: step budget of {} exhausted with {alive} alive and {pending} pending",
                self.stepper.max_steps()
            );
        }

        let DiagnosticSet {
            tracks,
            energy,
            steps,
            processes,
        } = self.diagnostics;
        Ok(RunResult {
            termination,
            steps: self.stepper.steps(),
            primaries: primaries.len(),
            alive_per_step: tracks.alive_per_step().to_vec(),
            energy_deposition: energy.histogram().clone(),
            steps_at_death: steps.counts().clone(),
            interactions: processes.counts().clone(),
            counters,
            timing,
        })
    }
}

/// Build a [`Transporter`] from `config` and run `primaries`.
pub fn transport(config: RunConfig, primaries: &[Primary]) -> Result<RunResult, RunError> {
    Transporter::new(config)?.run(primaries)
}
