//! Along-step action: step limitation, linear propagation and continuous
//! energy loss.
//!
//! The step is the shortest of
//!
//! - the distance to the next geometry boundary,
//! - the distance to the next discrete interaction (`num_mfp / total_xs`),
//! - the range under continuous loss (`energy / dedx`),
//! - the user step limit.
//!
//! A step that nothing limits means the track leaves the world.
//!
//! The discrete model is selected after continuous loss, at the energy
//! the model will see. If none applies there, the step ends without an
//! interaction and a new distance is sampled next step.

use lumen_action::{Action, ActionOrder, CoreParams};
use lumen_core::types::{axpy, is_unit, speed};
use lumen_core::{KernelError, TrackError};
use lumen_track::{launch, CoreState, StepLimit, StepLimitAction, TrackStatus, TrackView};
use rand::Rng;

/// Moves every alive track by one physical step.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlongStepAction;

impl Action for AlongStepAction {
    fn label(&self) -> &str {
        "along-step"
    }

    fn description(&self) -> &str {
        "propagate tracks and apply continuous energy loss"
    }

    fn order(&self) -> ActionOrder {
        ActionOrder::AlongStep
    }

    fn execute(&self, params: &CoreParams, state: &mut CoreState) -> Result<(), KernelError> {
        launch(self.label(), params.space, state, |track| {
            along_step(params, track)
        })
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Limit {
    Boundary,
    Interact,
    Range,
    User,
}

fn along_step(params: &CoreParams, track: &mut TrackView<'_>) -> Result<(), TrackError> {
    if !track.sim.is_alive() {
        return Ok(());
    }
    let particle = track.particle.particle;
    let energy = track.particle.energy;
    let pos = track.geo.pos;
    let dir = track.geo.dir;
    if !(energy.is_finite() && energy >= 0.0) {
        return Err(TrackError::InvalidEnergy { energy });
    }
    if !is_unit(dir) {
        return Err(TrackError::InvalidDirection { direction: dir });
    }
    let volume = track
        .geo
        .volume
        .ok_or(TrackError::OutsideGeometry { position: pos })?;

    track.sim.num_steps += 1;

    if track.physics.retry {
        // Stay in place; the model chosen last step interacts again.
        track.physics.retry = false;
        track.sim.step_limit.step = 0.0;
        return Ok(());
    }

    let physics = &params.physics;
    let xs = physics.total_xs(particle, energy);
    let num_mfp = match track.physics.num_mfp {
        Some(n) => n,
        None => -(1.0 - track.rng.random::<f64>()).ln(),
    };

    let hit = params.geometry.find_boundary(pos, dir, volume);
    track.geo.next_volume = hit.next_volume;

    let mut step = hit.distance.max(0.0);
    let mut limit = Limit::Boundary;
    let mut propose = |distance: f64, candidate: Limit| {
        if distance < step {
            step = distance;
            limit = candidate;
        }
    };
    if xs > 0.0 {
        propose(num_mfp / xs, Limit::Interact);
    }
    let dedx = physics.energy_loss(particle);
    if dedx > 0.0 {
        propose(energy / dedx, Limit::Range);
    }
    propose(physics.max_step(), Limit::User);

    if !step.is_finite() {
        track.sim.step_limit = StepLimit {
            step,
            action: Some(StepLimitAction::Boundary),
        };
        track.geo.volume = None;
        track.geo.next_volume = None;
        track.kill();
        return Ok(());
    }

    track.geo.pos = axpy(step, dir, pos);
    let v = speed(energy, params.particles.mass(particle));
    if v > 0.0 {
        track.sim.time += step / v;
    }
    track.physics.num_mfp = Some(num_mfp - step * xs);

    let loss = if limit == Limit::Range {
        energy
    } else {
        (dedx * step).min(energy)
    };
    let mut remaining = if limit == Limit::Range { 0.0 } else { energy - loss };
    track.physics.energy_deposition += loss;

    if limit == Limit::Boundary {
        track.geo.surface = hit.surface;
        track.geo.volume = hit.next_volume;
        if hit.next_volume.is_none() {
            track.kill();
        }
    }
    if track.sim.status == TrackStatus::Alive {
        let cutoff = params.cutoffs.get(particle).tracking;
        if remaining <= 0.0 || remaining < cutoff {
            track.physics.energy_deposition += remaining;
            remaining = 0.0;
            track.kill();
        }
    }

    let action = match limit {
        Limit::Boundary => StepLimitAction::Boundary,
        Limit::Interact => {
            track.physics.num_mfp = None;
            // Models are chosen at the post-loss energy they will see.
            let u = track.rng.random::<f64>();
            match physics.select_model(particle, remaining, u) {
                Some(model) if track.sim.status == TrackStatus::Alive => {
                    StepLimitAction::Interact(model)
                }
                _ => StepLimitAction::Rejected,
            }
        }
        Limit::Range => StepLimitAction::Range,
        Limit::User => StepLimitAction::UserLimit,
    };
    track.sim.step_limit = StepLimit {
        step,
        action: Some(action),
    };
    track.particle.energy = remaining;
    Ok(())
}
