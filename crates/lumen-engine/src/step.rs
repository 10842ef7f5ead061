//! The stepper: one step of the transport pipeline over every slot.
//!
//! Each [`Stepper::step()`] runs, in order:
//!
//! 1. initialize tracks from pending initializers into vacant slots
//! 2. reset per-step track state, then any pre-step actions
//! 3. along-step actions
//! 4. every model, in model order
//! 5. post-step actions
//! 6. `mid_step` diagnostics
//! 7. promote secondaries to initializers
//! 8. reclaim killed slots and clear the secondary arena
//! 9. `end_step` diagnostics
//!
//! Stages 1, 2, 7 and 8 are fixed; the actions and models fill in the
//! rest. Stages 1-5 are parallel sweeps, each finishing before the next
//! starts. Stages 6-9 run on the calling thread.
//!
//! # Failure latch
//!
//! A failed step leaves slots partially updated, so the run cannot
//! continue deterministically. After any step error the stepper is
//! disabled and every later call returns
//! [`StepError::StepDisabled`].

use std::time::Instant;

use lumen_action::{launch_models, ActionOrder, ActionSequence, CoreParams, InteractionAction};
use lumen_core::{InitError, Primary, StepError};
use lumen_track::{
    cleanup, extend_from_secondaries, initialize_tracks, start_step, CoreState, RngParams,
};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::{ConfigError, RunConfig};
use crate::diagnostic::Diagnostic;
use crate::metrics::{StepCounters, StepMetrics};

// ── StepResult ─────────────────────────────────────────────────────

/// Result of a successful [`Stepper::step()`] call.
#[derive(Clone, Debug)]
pub struct StepResult {
    /// Population counts for this step.
    pub counters: StepCounters,
    /// Timing for this step.
    pub metrics: StepMetrics,
}

// ── Stepper ────────────────────────────────────────────────────────

/// Owns the track state and runs the pipeline one step at a time.
pub struct Stepper {
    params: CoreParams,
    actions: ActionSequence,
    state: CoreState,
    pool: Option<ThreadPool>,
    max_steps: u64,
    steps: u64,
    disabled: bool,
    last_metrics: StepMetrics,
}

/// Output of the parallel half of a step.
struct Transported {
    initialized: usize,
    active: usize,
    initialize_us: u64,
    pre_step_us: u64,
    action_us: Vec<(String, u64)>,
    model_us: Vec<(String, u64)>,
}

impl Stepper {
    /// Validate `config` and allocate track state.
    pub fn new(config: RunConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let RunConfig {
            input,
            geometry,
            particles,
            physics,
            cutoffs,
            actions,
        } = config;

        let pool = input
            .threads
            .map(|n| {
                ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("lumen-worker-{i}"))
                    .build()
                    .map_err(|e| ConfigError::ThreadPool {
                        reason: e.to_string(),
                    })
            })
            .transpose()?;

        let actions = ActionSequence::new(actions, &physics)?;
        let params = CoreParams {
            geometry,
            particles,
            physics,
            cutoffs,
            rng: RngParams { seed: input.seed },
            space: input.execution_space,
        };
        let state = CoreState::new(
            input.track_slots,
            input.initializer_capacity,
            input.secondary_capacity,
        );

        Ok(Self {
            params,
            actions,
            state,
            pool,
            max_steps: input.max_steps,
            steps: 0,
            disabled: false,
            last_metrics: StepMetrics::default(),
        })
    }

    /// Queue primaries for initialization.
    ///
    /// Fails without queuing anything if they do not fit in the
    /// initializer buffer.
    pub fn load_primaries(&mut self, primaries: &[Primary]) -> Result<(), InitError> {
        self.state.init_mut().extend_from_primaries(primaries)
    }

    /// Run one step.
    ///
    /// Returns [`StepError::StepDisabled`] after an earlier failure and
    /// [`StepError::StepBudgetExhausted`] once `max_steps` steps have run.
    pub fn step(&mut self, diagnostics: &mut dyn Diagnostic) -> Result<StepResult, StepError> {
        if self.disabled {
            return Err(StepError::StepDisabled);
        }
        if self.steps >= self.max_steps {
            return Err(StepError::StepBudgetExhausted);
        }
        match self.execute(diagnostics) {
            Ok(result) => {
                self.steps += 1;
                self.last_metrics = result.metrics.clone();
                Ok(result)
            }
            Err(e) => {
                self.disabled = true;
                Err(e)
            }
        }
    }

    fn execute(&mut self, diagnostics: &mut dyn Diagnostic) -> Result<StepResult, StepError> {
        let step_start = Instant::now();
        let step = self.steps;
        let Self {
            params,
            actions,
            state,
            pool,
            ..
        } = self;
        let params = &*params;
        let actions = &*actions;

        let transported = match pool {
            Some(pool) => pool.install(|| transport(params, actions, state))?,
            None => transport(params, actions, state)?,
        };

        let failed_interactions = state
            .slots()
            .filter(|t| {
                t.sim.is_alive()
                    && t.interaction
                        .is_some_and(|i| i.action == InteractionAction::Failed)
            })
            .count();
        let secondaries = state.secondaries().size();
        let arena_exhausted = state.secondaries().is_exhausted();

        diagnostics.mid_step(params, state);

        let harvest_start = Instant::now();
        let promoted = extend_from_secondaries(&params.cutoffs, state)?;
        let harvest_us = harvest_start.elapsed().as_micros() as u64;

        let cleanup_start = Instant::now();
        let killed = cleanup(state);
        let cleanup_us = cleanup_start.elapsed().as_micros() as u64;

        diagnostics.end_step(params, state);

        let counters = StepCounters {
            step,
            active: transported.active,
            initialized: transported.initialized,
            alive: state.num_alive(),
            pending: state.num_initializers(),
            secondaries,
            promoted,
            killed,
            failed_interactions,
            arena_exhausted,
        };
        let metrics = StepMetrics {
            total_us: step_start.elapsed().as_micros() as u64,
            initialize_us: transported.initialize_us,
            pre_step_us: transported.pre_step_us,
            action_us: transported.action_us,
            model_us: transported.model_us,
            harvest_us,
            cleanup_us,
        };
        Ok(StepResult { counters, metrics })
    }

    /// Steps completed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Step budget.
    pub fn max_steps(&self) -> u64 {
        self.max_steps
    }

    /// Whether a previous step failed.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Whether slots are occupied or initializers pending.
    pub fn has_work(&self) -> bool {
        self.state.num_alive() > 0 || self.state.num_initializers() > 0
    }

    /// Shared parameters.
    pub fn params(&self) -> &CoreParams {
        &self.params
    }

    /// Validated action sequence.
    pub fn actions(&self) -> &ActionSequence {
        &self.actions
    }

    /// Track state.
    pub fn state(&self) -> &CoreState {
        &self.state
    }

    /// Metrics of the most recent successful step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }
}

impl std::fmt::Debug for Stepper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stepper")
            .field("actions", &self.actions)
            .field("state", &self.state)
            .field("threads", &self.pool.as_ref().map(|p| p.current_num_threads()))
            .field("steps", &self.steps)
            .field("max_steps", &self.max_steps)
            .field("disabled", &self.disabled)
            .finish()
    }
}

/// Stages 1-5.
fn transport(
    params: &CoreParams,
    actions: &ActionSequence,
    state: &mut CoreState,
) -> Result<Transported, StepError> {
    let start = Instant::now();
    let initialized = initialize_tracks(&*params.geometry, &params.rng, params.space, state)?;
    let initialize_us = start.elapsed().as_micros() as u64;
    let active = state.count_occupied();

    let start = Instant::now();
    start_step(params.space, state)?;
    let pre_step_us = start.elapsed().as_micros() as u64;

    let mut action_us = Vec::with_capacity(actions.len());
    let mut run_stage = |order: ActionOrder, state: &mut CoreState| -> Result<(), StepError> {
        for (_, action) in actions.stage(order) {
            let start = Instant::now();
            action.execute(params, state)?;
            action_us.push((action.label().to_string(), start.elapsed().as_micros() as u64));
        }
        Ok(())
    };
    run_stage(ActionOrder::PreStep, state)?;
    run_stage(ActionOrder::AlongStep, state)?;
    let model_us = launch_models(params, state)?
        .into_iter()
        .zip(params.physics.models())
        .map(|(elapsed, (_, model))| (model.label().to_string(), elapsed.as_micros() as u64))
        .collect();
    run_stage(ActionOrder::PostStep, state)?;

    Ok(Transported {
        initialized,
        active,
        initialize_us,
        pre_step_us,
        action_us,
        model_us,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use lumen_action::{Action, PhysicsParams};
    use lumen_core::{BoundaryHit, GeometryOracle, KernelError, Real3, VolumeId};
    use lumen_track::{CutoffParams, ParticleParams};

    use crate::config::RunInput;

    struct Nowhere;

    impl GeometryOracle for Nowhere {
        fn name(&self) -> &str {
            "nowhere"
        }
        fn num_volumes(&self) -> usize {
            1
        }
        fn locate(&self, _: Real3) -> Option<VolumeId> {
            Some(VolumeId(0))
        }
        fn find_boundary(&self, _: Real3, _: Real3, _: VolumeId) -> BoundaryHit {
            BoundaryHit::NONE
        }
    }

    struct Idle;

    impl Action for Idle {
        fn label(&self) -> &str {
            "idle"
        }
        fn order(&self) -> ActionOrder {
            ActionOrder::AlongStep
        }
        fn execute(&self, _: &CoreParams, _: &mut CoreState) -> Result<(), KernelError> {
            Ok(())
        }
    }

    fn config(input: RunInput, physics: PhysicsParams) -> RunConfig {
        RunConfig {
            input,
            geometry: Arc::new(Nowhere),
            particles: ParticleParams::new(),
            physics,
            cutoffs: CutoffParams::new(),
            actions: vec![Box::new(Idle)],
        }
    }

    #[test]
    fn empty_registry_rejected() {
        let err = Stepper::new(config(RunInput::default(), PhysicsParams::new())).unwrap_err();
        assert!(matches!(err, ConfigError::Pipeline(_)), "got {err:?}");
    }

    #[test]
    fn zero_threads_rejected_before_pool_build() {
        let input = RunInput {
            threads: Some(0),
            ..RunInput::default()
        };
        let err = Stepper::new(config(input, PhysicsParams::new())).unwrap_err();
        assert_eq!(err, ConfigError::InvalidThreadCount);
    }
}
