//! Reusable model and action fixtures.
//!
//! Models:
//!
//! - [`KillModel`]: absorbs every track it covers.
//! - [`SecondaryModel`]: absorbs the track and emits N secondaries.
//! - [`CallbackModel`]: delegates `interact` to a closure.
//! - [`FailingModel`]: returns a model error for selected tracks.
//!
//! Actions:
//!
//! - [`NoopAction`]: does nothing, in any stage.
//! - [`CountingAction`]: counts executions.
//! - [`ForceInteractAction`]: an along-step that sends every track
//!   straight into one model, with no movement.
//! - [`FailingAction`]: fails every alive track after N calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lumen_action::{Action, ActionOrder, Applicability, CoreParams, Interaction, Model};
use lumen_core::{KernelError, ModelId, ParticleId, Secondary, TrackError, TrackId};
use lumen_track::{launch, CoreState, StepLimit, StepLimitAction, TrackStatus, TrackView};

use crate::{ELECTRON, GAMMA, POSITRON};

fn all_particles() -> Applicability {
    Applicability::new([GAMMA, ELECTRON, POSITRON], 0.0, f64::INFINITY)
}

// ── Models ─────────────────────────────────────────────────────────

/// Absorbs every covered track, depositing its energy.
pub struct KillModel {
    pub label: String,
    pub applicability: Applicability,
    pub xs: f64,
}

impl KillModel {
    /// Covers all three test particles at every energy.
    pub fn new(xs: f64) -> Self {
        Self {
            label: "kill".to_string(),
            applicability: all_particles(),
            xs,
        }
    }

    pub fn for_particles(
        label: impl Into<String>,
        particles: impl IntoIterator<Item = ParticleId>,
        xs: f64,
    ) -> Self {
        Self {
            label: label.into(),
            applicability: Applicability::new(particles, 0.0, f64::INFINITY),
            xs,
        }
    }
}

impl Model for KillModel {
    fn label(&self) -> &str {
        &self.label
    }

    fn applicability(&self) -> Applicability {
        self.applicability.clone()
    }

    fn macro_xs(&self, _particle: ParticleId, _energy: f64) -> f64 {
        self.xs
    }

    fn interact(&self, track: &mut TrackView<'_>) -> Result<Interaction, TrackError> {
        Ok(Interaction::absorbed(track.particle.energy))
    }
}

/// Absorbs `parent` tracks and emits `count` `child` secondaries that
/// split the parent's energy equally.
///
/// Reports a failed interaction when the step arena is full.
pub struct SecondaryModel {
    pub parent: ParticleId,
    pub child: ParticleId,
    pub count: usize,
    pub xs: f64,
}

impl SecondaryModel {
    pub fn new(parent: ParticleId, child: ParticleId, count: usize, xs: f64) -> Self {
        Self {
            parent,
            child,
            count,
            xs,
        }
    }
}

impl Model for SecondaryModel {
    fn label(&self) -> &str {
        "emit"
    }

    fn applicability(&self) -> Applicability {
        Applicability::new([self.parent], 0.0, f64::INFINITY)
    }

    fn macro_xs(&self, _particle: ParticleId, _energy: f64) -> f64 {
        self.xs
    }

    fn interact(&self, track: &mut TrackView<'_>) -> Result<Interaction, TrackError> {
        let Ok(reservation) = track.secondaries.allocate(self.count) else {
            return Ok(Interaction::failed());
        };
        let energy = track.particle.energy / self.count.max(1) as f64;
        let secondary = Secondary {
            particle: self.child,
            energy,
            direction: track.geo.dir,
        };
        reservation
            .write_all(std::iter::repeat_n(secondary, self.count))
            .map_err(|e| TrackError::Model {
                model: self.label().to_string(),
                reason: e.to_string(),
            })?;
        Ok(Interaction::absorbed(0.0).with_secondaries(reservation.span()))
    }
}

type InteractFn = dyn Fn(&mut TrackView<'_>) -> Result<Interaction, TrackError> + Send + Sync;

/// Delegates `interact` to a closure.
pub struct CallbackModel {
    pub label: String,
    pub applicability: Applicability,
    pub xs: f64,
    callback: Arc<InteractFn>,
}

impl CallbackModel {
    /// Covers all three test particles at every energy.
    pub fn new<F>(label: impl Into<String>, xs: f64, callback: F) -> Self
    where
        F: Fn(&mut TrackView<'_>) -> Result<Interaction, TrackError> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            applicability: all_particles(),
            xs,
            callback: Arc::new(callback),
        }
    }
}

impl Model for CallbackModel {
    fn label(&self) -> &str {
        &self.label
    }

    fn applicability(&self) -> Applicability {
        self.applicability.clone()
    }

    fn macro_xs(&self, _particle: ParticleId, _energy: f64) -> f64 {
        self.xs
    }

    fn interact(&self, track: &mut TrackView<'_>) -> Result<Interaction, TrackError> {
        (self.callback)(track)
    }
}

/// Fails on tracks whose id passes `fails`, absorbs the rest.
pub struct FailingModel {
    pub xs: f64,
    fails: fn(TrackId) -> bool,
}

impl FailingModel {
    pub fn new(xs: f64, fails: fn(TrackId) -> bool) -> Self {
        Self { xs, fails }
    }

    /// Fails on every track.
    pub fn always(xs: f64) -> Self {
        Self::new(xs, |_| true)
    }
}

impl Model for FailingModel {
    fn label(&self) -> &str {
        "failing"
    }

    fn applicability(&self) -> Applicability {
        all_particles()
    }

    fn macro_xs(&self, _particle: ParticleId, _energy: f64) -> f64 {
        self.xs
    }

    fn interact(&self, track: &mut TrackView<'_>) -> Result<Interaction, TrackError> {
        match track.sim.track_id {
            Some(id) if (self.fails)(id) => Err(TrackError::Model {
                model: self.label().to_string(),
                reason: format!("injected failure on track {id}"),
            }),
            _ => Ok(Interaction::absorbed(track.particle.energy)),
        }
    }
}

// ── Actions ────────────────────────────────────────────────────────

/// Does nothing.
pub struct NoopAction {
    pub label: String,
    pub order: ActionOrder,
}

impl NoopAction {
    pub fn new(label: impl Into<String>, order: ActionOrder) -> Self {
        Self {
            label: label.into(),
            order,
        }
    }
}

impl Action for NoopAction {
    fn label(&self) -> &str {
        &self.label
    }

    fn order(&self) -> ActionOrder {
        self.order
    }

    fn execute(&self, _params: &CoreParams, _state: &mut CoreState) -> Result<(), KernelError> {
        Ok(())
    }
}

/// Counts how many times it has executed.
pub struct CountingAction {
    pub label: String,
    pub order: ActionOrder,
    calls: Arc<AtomicUsize>,
}

impl CountingAction {
    /// Returns the action and a handle to its call counter.
    pub fn new(label: impl Into<String>, order: ActionOrder) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                label: label.into(),
                order,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl Action for CountingAction {
    fn label(&self) -> &str {
        &self.label
    }

    fn order(&self) -> ActionOrder {
        self.order
    }

    fn execute(&self, _params: &CoreParams, _state: &mut CoreState) -> Result<(), KernelError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Along-step stand-in: promotes new tracks, counts the step and ends
/// it in `model` without moving the track.
pub struct ForceInteractAction {
    pub model: ModelId,
}

impl ForceInteractAction {
    pub fn new(model: ModelId) -> Self {
        Self { model }
    }
}

impl Action for ForceInteractAction {
    fn label(&self) -> &str {
        "force-interact"
    }

    fn order(&self) -> ActionOrder {
        ActionOrder::AlongStep
    }

    fn execute(&self, params: &CoreParams, state: &mut CoreState) -> Result<(), KernelError> {
        launch(self.label(), params.space, state, |track| {
            if track.sim.track_id.is_none() || track.sim.status == TrackStatus::Killed {
                return Ok(());
            }
            track.sim.status = TrackStatus::Alive;
            track.sim.num_steps += 1;
            *track.interaction = None;
            track.physics.energy_deposition = 0.0;
            track.sim.step_limit = StepLimit {
                step: 0.0,
                action: Some(StepLimitAction::Interact(self.model)),
            };
            Ok(())
        })
    }
}

/// Fails on every alive track once it has run `after` times.
pub struct FailingAction {
    pub order: ActionOrder,
    pub after: usize,
    calls: AtomicUsize,
}

impl FailingAction {
    pub fn new(order: ActionOrder, after: usize) -> Self {
        Self {
            order,
            after,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Action for FailingAction {
    fn label(&self) -> &str {
        "failing-action"
    }

    fn order(&self) -> ActionOrder {
        self.order
    }

    fn execute(&self, params: &CoreParams, state: &mut CoreState) -> Result<(), KernelError> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed);
        if n < self.after {
            return Ok(());
        }
        launch(self.label(), params.space, state, |track| {
            if track.sim.track_id.is_none() {
                return Ok(());
            }
            Err(TrackError::InvalidEnergy {
                energy: track.particle.energy,
            })
        })
    }
}
